use std::{path::PathBuf, time::Duration};

use argrec::{Record, Value};
use expect_test::{expect, Expect};

fn check_fields<R: Record>(expect: Expect) {
    let fields = R::fields()
        .into_iter()
        .map(|it| {
            let tags: Vec<String> = it
                .tags
                .iter()
                .map(|(key, value)| match value {
                    Some(value) => format!("{key}={value}"),
                    None => key.to_string(),
                })
                .collect();
            let mut line = format!("{}: {:?} {}", it.name, it.shape, it.ty);
            if !tags.is_empty() {
                line += &format!(" [{}]", tags.join(", "));
            }
            if let Some(doc) = it.doc {
                line += &format!(" {doc:?}");
            }
            line + "\n"
        })
        .collect::<String>();
    expect.assert_eq(&fields);
}

#[derive(Debug, Default, Record)]
struct Everything {
    /// Number of jobs.
    ///
    /// Defaults to four.
    #[arg(short = "j", default = "4")]
    jobs: usize,
    r#type: Option<String>,
    key: Vec<u8>,
    #[arg(min = 1, invert)]
    items: Vec<PathBuf>,
    pair: [i32; 2],
    #[arg(min_val = -5)]
    offset: i64,
    timeout: Option<Duration>,
}

#[test]
fn declarations() {
    check_fields::<Everything>(expect![[r#"
        jobs: Scalar usize [short=j, default=4] "Number of jobs.\n\nDefaults to four."
        type: Optional string
        key: Scalar bytes
        items: Sequence path [min=1, invert]
        pair: Array(2) i32
        offset: Scalar i64 [min_val=-5]
        timeout: Optional duration
    "#]]);
}

#[test]
fn bind_by_shape() {
    let mut it = Everything::default();
    it.bind(0, 0, Value::Usize(8)).unwrap();
    it.bind(1, 0, Value::String("fn".to_string())).unwrap();
    it.bind(2, 0, Value::Bytes(vec![0xca, 0xfe])).unwrap();
    it.bind(3, 0, Value::Path("a".into())).unwrap();
    it.bind(3, 0, Value::Path("b".into())).unwrap();
    it.bind(4, 1, Value::I32(-1)).unwrap();
    it.bind(6, 0, Value::Duration(Duration::from_secs(3))).unwrap();

    expect![[r#"
        Everything {
            jobs: 8,
            type: Some(
                "fn",
            ),
            key: [
                202,
                254,
            ],
            items: [
                "a",
                "b",
            ],
            pair: [
                0,
                -1,
            ],
            offset: 0,
            timeout: Some(
                3s,
            ),
        }
    "#]]
    .assert_debug_eq(&it);
}

#[test]
fn wrong_value_is_handed_back() {
    let mut it = Everything::default();
    assert_eq!(it.bind(0, 0, Value::I32(1)), Err(Value::I32(1)));
    assert_eq!(it.bind(3, 0, Value::String("a".into())), Err(Value::String("a".into())));
    assert_eq!(it.bind(99, 0, Value::Bool(true)), Err(Value::Bool(true)));
    assert_eq!(it.jobs, 0);
    assert!(it.items.is_empty());
}

#[test]
fn current_and_adopt() {
    let mut it = Everything::default();
    assert_eq!(it.current(0), Some(Value::Usize(0)));
    assert_eq!(it.current(1), None);
    assert_eq!(it.current(3), None);

    let other = Everything {
        jobs: 2,
        r#type: Some("struct".to_string()),
        items: vec!["x".into()],
        ..Everything::default()
    };
    assert_eq!(other.current(1), Some(Value::String("struct".to_string())));

    it.adopt(1, &other);
    it.adopt(3, &other);
    assert_eq!(it.jobs, 0);
    assert_eq!(it.r#type.as_deref(), Some("struct"));
    assert_eq!(it.items, [PathBuf::from("x")]);
}

#[derive(Debug, Default, Record)]
struct Unit;

#[derive(Debug, Default, Record)]
pub struct Empty {}

#[test]
fn empty_records() {
    check_fields::<Unit>(expect![""]);
    check_fields::<Empty>(expect![""]);
    assert_eq!(Unit.bind(0, 0, Value::Bool(true)), Err(Value::Bool(true)));
    assert_eq!(Empty {}.current(0), None);
}
