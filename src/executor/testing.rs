//! Shared fixtures for executor unit tests.

use crate::access::{Row, TableView, Value};

fn table(fields: &[&str], rows: Vec<Vec<Value>>) -> TableView {
    let rows: Vec<Row> = rows
        .into_iter()
        .map(|values| {
            fields
                .iter()
                .map(|f| f.to_string())
                .zip(values)
                .collect()
        })
        .collect();
    TableView::new(rows, Some(fields.iter().map(|f| f.to_string()).collect()))
}

pub fn users() -> TableView {
    let row = |id: i32, name: &str, city: Option<&str>, age: i32, score: i32, gender: Option<&str>| {
        vec![
            Value::from(id),
            Value::from(name),
            Value::from(city),
            Value::from(age),
            Value::from(score),
            Value::from(gender),
        ]
    };
    table(
        &["id", "name", "city", "age", "score", "gender"],
        vec![
            row(1, "张三", Some("北京"), 20, 95, Some("男")),
            row(2, "李四", Some("上海"), 22, 88, Some("女")),
            row(3, "王五", Some("北京"), 21, 91, Some("男")),
            row(4, "lucy", Some("深圳"), 23, 77, Some("女")),
            row(5, "tom", None, 20, 88, Some("男")),
            row(6, "赵六", Some("广州"), 24, 82, None),
        ],
    )
}

pub fn orders() -> TableView {
    let row = |no: i32, user_id: i32, amount: i32, status: &str| {
        vec![
            Value::from(no),
            Value::from(user_id),
            Value::from(amount),
            Value::from(status),
        ]
    };
    table(
        &["order_no", "user_id", "amount", "status"],
        vec![
            row(101, 1, 200, "已支付"),
            row(102, 2, 150, "待支付"),
            row(103, 1, 300, "已支付"),
            row(104, 3, 120, "已取消"),
            row(105, 4, 180, "已支付"),
            row(106, 6, 210, "已支付"),
        ],
    )
}

pub fn empty(fields: &[&str]) -> TableView {
    TableView::empty(fields.iter().map(|f| f.to_string()).collect())
}
