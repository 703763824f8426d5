#![cfg(feature = "derive")]

use std::sync::OnceLock;

use safejson::{Field, FieldDescriptor, Kind, Reflect, Value, normalize, pretty_json};

#[derive(Reflect)]
struct Account {
    #[json("ID")]
    pub id: u64,
    pub username: String,
    #[json(",omitempty")]
    pub nickname: String,
    #[json("tags,omitempty")]
    pub tags: Vec<String>,
    #[json("-")]
    pub session: Session,
    internal_counter: u32,
}

// deliberately not Reflect: excluded fields are never looked at
struct Session;

fn account() -> Account {
    Account {
        id: 7,
        username: String::from("john"),
        nickname: String::new(),
        tags: Vec::new(),
        session: Session,
        internal_counter: 3,
    }
}

#[test]
fn fields_follow_declaration_order_and_tags() -> Result<(), Box<dyn std::error::Error>> {
    let acct = account();
    let _ = (&acct.session, acct.internal_counter);

    let v = normalize(&acct);
    let obj = v.as_object().expect("object");
    assert_eq!(obj.keys().collect::<Vec<_>>(), vec!["ID", "username"]);

    let out = pretty_json(&acct)?;
    assert_eq!(out, "{\n\t\"ID\": 7,\n\t\"username\": \"john\"\n}\n");
    Ok(())
}

#[test]
fn omitempty_keeps_non_empty_values() {
    let mut acct = account();
    acct.nickname = String::from("jj");
    acct.tags = vec![String::from("admin")];
    let v = normalize(&acct);
    assert_eq!(v.get("nickname"), Some(&Value::from("jj")));
    assert_eq!(v.get("tags"), Some(&Value::List(vec![Value::from("admin")])));
}

#[derive(Reflect)]
struct Profile {
    #[json("age,omitempty")]
    pub age: Option<u32>,
    #[json("owner,omitempty")]
    pub owner: Option<Box<Owner>>,
}

#[derive(Reflect)]
struct Owner {
    #[json("name,omitempty")]
    pub name: String,
}

#[test]
fn nil_pointer_with_omitempty_is_absent() {
    let v = normalize(&Profile { age: None, owner: None });
    assert_eq!(v, Value::Object(Default::default()));

    let v = normalize(&Profile {
        age: Some(31),
        owner: Some(Box::new(Owner { name: String::from("ann") })),
    });
    assert_eq!(v.get("age"), Some(&Value::from(31u32)));
    assert_eq!(v.get("owner").and_then(|o| o.get("name")), Some(&Value::from("ann")));
}

#[test]
fn emptiness_is_judged_after_normalization() {
    // a pointer to zero and a record with nothing to show both normalize to empty nodes
    let v = normalize(&Profile {
        age: Some(0),
        owner: Some(Box::new(Owner { name: String::new() })),
    });
    assert_eq!(v.as_object().map(|o| o.len()), Some(0));
}

#[derive(Reflect)]
struct Collision {
    #[json("id")]
    pub first: i32,
    pub middle: i32,
    #[json("id")]
    pub second: i32,
}

#[test]
fn later_field_wins_a_key_collision() -> Result<(), Box<dyn std::error::Error>> {
    let out = pretty_json(&Collision { first: 1, middle: 5, second: 2 })?;
    assert_eq!(out, "{\n\t\"id\": 2,\n\t\"middle\": 5\n}\n");
    Ok(())
}

struct Tripwire;

impl Reflect for Tripwire {
    fn kind(&self) -> Kind<'_> {
        panic!("skipped field was visited");
    }
}

struct Manual {
    shown: i32,
    hidden: Tripwire,
}

impl Reflect for Manual {
    fn kind(&self) -> Kind<'_> {
        static FIELDS: OnceLock<[FieldDescriptor; 2]> = OnceLock::new();
        let fields = FIELDS.get_or_init(|| {
            [
                FieldDescriptor::parse("shown", Some("shown"), None),
                FieldDescriptor::parse("hidden", Some("-"), None),
            ]
        });
        Kind::Struct(vec![
            Field::new(&fields[0], &self.shown),
            Field::new(&fields[1], &self.hidden),
        ])
    }
}

#[test]
fn skipped_fields_are_never_visited() {
    let v = normalize(&Manual { shown: 1, hidden: Tripwire });
    assert_eq!(v.get("shown"), Some(&Value::from(1)));
    assert_eq!(v.get("hidden"), None);
}

#[derive(Reflect)]
struct UserId(pub u64);

#[derive(Reflect)]
struct Marker;

#[derive(Reflect)]
enum Role {
    Admin,
    #[json("read-only")]
    ReadOnly,
}

#[derive(Reflect)]
struct Page<T> {
    pub items: Vec<T>,
    #[json("next,omitempty")]
    pub next: Option<String>,
}

#[test]
fn derive_shapes() {
    assert_eq!(normalize(&UserId(9)), Value::from(9u64));
    assert_eq!(normalize(&Marker), Value::Object(Default::default()));
    assert_eq!(normalize(&Role::Admin), Value::from("Admin"));
    assert_eq!(normalize(&Role::ReadOnly), Value::from("read-only"));

    let page = Page { items: vec![Role::Admin, Role::ReadOnly], next: None };
    let v = normalize(&page);
    assert_eq!(
        v.get("items"),
        Some(&Value::List(vec![Value::from("Admin"), Value::from("read-only")]))
    );
    assert!(v.get("next").is_none());
}
