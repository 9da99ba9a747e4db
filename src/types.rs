/**
    xenapi-rs provides a Rust based XenAPI client.
    Copyright (C) 2016 Star Lab Corp.

    This program is free software; you can redistribute it and/or modify
    it under the terms of the GNU General Public License as published by
    the Free Software Foundation; either version 2 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU General Public License for more details.

    You should have received a copy of the GNU General Public License along
    with this program; if not, see <http://www.gnu.org/licenses/>.
**/

// Conversions between XML-RPC values and the types XenAPI talks about.
//
// xapi has a few conventions of its own on top of plain XML-RPC: 64-bit
// ints travel as decimal strings, maps travel as structs keyed by the
// string form of the key, and references are opaque strings.

use error::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use wire;
use xmlrpc::Value;

pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self>;
}

pub trait ToValue {
    fn to_value(&self) -> Value;
}

fn mismatch<T>(expected: &str, found: &Value) -> Result<T> {
    Err(Error::Decode(format!("expected {}, found {}", expected, found.kind())))
}

/// Attach the record and field name to a decode failure
#[doc(hidden)]
pub fn in_field(record: &str, field: &str, err: Error) -> Error {
    match err {
        Error::Decode(msg) => Error::Decode(format!("{}.{}: {}", record, field, msg)),
        other => other,
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Value> {
        Ok(value)
    }
}

/// Calls without a result still send back an empty string
impl FromValue for () {
    fn from_value(_: Value) -> Result<()> {
        Ok(())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<String> {
        match value {
            Value::String(s) => Ok(s),
            other => mismatch("string", &other),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<bool> {
        match value {
            Value::Boolean(b) => Ok(b),
            other => mismatch("boolean", &other),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<i64> {
        match value {
            Value::Int(i) => Ok(i),
            Value::String(s) => {
                s.trim()
                    .parse::<i64>()
                    .map_err(|_| Error::Decode(format!("expected int, found {:?}", s)))
            }
            other => mismatch("int", &other),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<f64> {
        match value {
            Value::Double(d) => Ok(d),
            Value::Int(i) => Ok(i as f64),
            Value::String(s) => {
                s.trim()
                    .parse::<f64>()
                    .map_err(|_| Error::Decode(format!("expected double, found {:?}", s)))
            }
            other => mismatch("double", &other),
        }
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Vec<T>> {
        match value {
            Value::Array(values) => values.into_iter().map(T::from_value).collect(),
            other => mismatch("array", &other),
        }
    }
}

impl<K, V> FromValue for HashMap<K, V>
    where K: FromValue + Eq + Hash,
          V: FromValue
{
    fn from_value(value: Value) -> Result<HashMap<K, V>> {
        match value {
            Value::Struct(members) => {
                members.into_iter()
                    .map(|(k, v)| Ok((K::from_value(Value::String(k))?, V::from_value(v)?)))
                    .collect()
            }
            other => mismatch("struct", &other),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Option<T>> {
        match value {
            Value::Nil => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_owned())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }
}

/// xapi wants every int as a string
impl ToValue for i64 {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Double(*self)
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

fn key_string(key: Value) -> String {
    match key {
        Value::String(s) | Value::DateTime(s) => s,
        Value::Int(i) => i.to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::Double(d) => d.to_string(),
        other => {
            warn!("{} cannot be a struct key", other.kind());
            String::new()
        }
    }
}

impl<K, V> ToValue for HashMap<K, V>
    where K: ToValue + Eq + Hash,
          V: ToValue
{
    fn to_value(&self) -> Value {
        let members = self.iter()
            .map(|(k, v)| (key_string(k.to_value()), v.to_value()))
            .collect::<BTreeMap<String, Value>>();
        Value::Struct(members)
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match *self {
            Some(ref v) => v.to_value(),
            None => Value::Nil,
        }
    }
}

impl<'a, T: ToValue + ?Sized> ToValue for &'a T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

/// A timestamp exactly as xapi sent it, e.g. `20161129T16:34:02Z`
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct DateTime(pub String);

impl FromValue for DateTime {
    fn from_value(value: Value) -> Result<DateTime> {
        match value {
            // some fields carry their timestamps as plain strings
            Value::DateTime(s) | Value::String(s) => Ok(DateTime(s)),
            other => mismatch("dateTime.iso8601", &other),
        }
    }
}

impl ToValue for DateTime {
    fn to_value(&self) -> Value {
        Value::DateTime(self.0.clone())
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reference to a remote object of class `C`
pub struct Ref<C> {
    opaque: String,
    class: PhantomData<C>,
}

impl<C> Ref<C> {
    pub fn new<S: Into<String>>(opaque: S) -> Ref<C> {
        Ref {
            opaque: opaque.into(),
            class: PhantomData,
        }
    }

    /// The reference that points at nothing
    pub fn null() -> Ref<C> {
        Ref::new(wire::NULL_REF)
    }

    pub fn is_null(&self) -> bool {
        self.opaque == wire::NULL_REF || self.opaque.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.opaque
    }
}

impl<C> Clone for Ref<C> {
    fn clone(&self) -> Ref<C> {
        Ref::new(self.opaque.clone())
    }
}

impl<C> PartialEq for Ref<C> {
    fn eq(&self, other: &Ref<C>) -> bool {
        self.opaque == other.opaque
    }
}

impl<C> Eq for Ref<C> {}

impl<C> Hash for Ref<C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.opaque.hash(state)
    }
}

impl<C> Default for Ref<C> {
    fn default() -> Ref<C> {
        Ref::null()
    }
}

impl<C> fmt::Debug for Ref<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Ref({})", self.opaque)
    }
}

impl<C> fmt::Display for Ref<C> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.opaque)
    }
}

impl<'a, C> From<&'a str> for Ref<C> {
    fn from(s: &'a str) -> Ref<C> {
        Ref::new(s)
    }
}

impl<C> From<String> for Ref<C> {
    fn from(s: String) -> Ref<C> {
        Ref::new(s)
    }
}

impl<C> FromValue for Ref<C> {
    fn from_value(value: Value) -> Result<Ref<C>> {
        match value {
            Value::String(s) => Ok(Ref::new(s)),
            other => mismatch("reference", &other),
        }
    }
}

impl<C> ToValue for Ref<C> {
    fn to_value(&self) -> Value {
        Value::String(self.opaque.clone())
    }
}

/// Build a parameter list from anything `ToValue`
macro_rules! params {
    () => { Vec::<$crate::xmlrpc::Value>::new() };
    ($($arg:expr),+ $(,)*) => {
        vec![$($crate::types::ToValue::to_value(&$arg)),+]
    };
}

/// Declare a XenAPI enum. Names are matched without regard to case and
/// names this client has never heard of land in `Unrecognized`.
macro_rules! xenapi_enum {
    ($(#[$meta:meta])*
     pub enum $name:ident {
         $($(#[$vmeta:meta])* $variant:ident => $wire:expr,)*
     }) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Eq, Hash, PartialEq)]
        pub enum $name {
            $($(#[$vmeta])* $variant,)*
            Unrecognized(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match *self {
                    $($name::$variant => $wire,)*
                    $name::Unrecognized(ref s) => s,
                }
            }

            pub fn from_wire(s: &str) -> $name {
                $(if s.eq_ignore_ascii_case($wire) {
                    return $name::$variant;
                })*
                $name::Unrecognized(s.to_owned())
            }
        }

        impl Default for $name {
            fn default() -> $name {
                $name::Unrecognized(String::new())
            }
        }

        impl ::std::fmt::Display for $name {
            fn fmt(&self, f: &mut ::std::fmt::Formatter) -> ::std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl $crate::types::FromValue for $name {
            fn from_value(value: $crate::xmlrpc::Value) -> $crate::error::Result<$name> {
                match value {
                    $crate::xmlrpc::Value::String(s) => Ok($name::from_wire(&s)),
                    other => {
                        Err($crate::error::Error::Decode(format!("expected {}, found {}",
                                                                 stringify!($name),
                                                                 other.kind())))
                    }
                }
            }
        }

        impl $crate::types::ToValue for $name {
            fn to_value(&self) -> $crate::xmlrpc::Value {
                $crate::xmlrpc::Value::String(self.as_str().to_owned())
            }
        }
    }
}

/// Declare a XenAPI record. Members the server sends that are not listed
/// are ignored; listed members the server leaves out take their default.
macro_rules! xenapi_record {
    ($(#[$meta:meta])*
     pub struct $name:ident {
         $($(#[$fmeta:meta])* pub $field:ident: $ty:ty => $wire:expr,)*
     }) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq)]
        pub struct $name {
            $($(#[$fmeta])* pub $field: $ty,)*
        }

        impl $crate::types::FromValue for $name {
            fn from_value(value: $crate::xmlrpc::Value) -> $crate::error::Result<$name> {
                let mut members = match value {
                    $crate::xmlrpc::Value::Struct(members) => members,
                    other => {
                        return Err($crate::error::Error::Decode(format!("expected {}, found {}",
                                                                        stringify!($name),
                                                                        other.kind())))
                    }
                };

                Ok($name {
                    $($field: match members.remove($wire) {
                        Some(v) => {
                            $crate::types::FromValue::from_value(v).map_err(|e| {
                                $crate::types::in_field(stringify!($name), $wire, e)
                            })?
                        }
                        None => Default::default(),
                    },)*
                })
            }
        }

        impl $crate::types::ToValue for $name {
            fn to_value(&self) -> $crate::xmlrpc::Value {
                let mut members = ::std::collections::BTreeMap::new();
                $(members.insert(String::from($wire),
                                 $crate::types::ToValue::to_value(&self.$field));)*
                $crate::xmlrpc::Value::Struct(members)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use error::Error;
    use std::collections::{BTreeMap, HashMap};
    use super::*;
    use xmlrpc::Value;

    enum Widget {}

    xenapi_enum! {
        pub enum Colour {
            Red => "red",
            DarkBlue => "dark_blue",
        }
    }

    xenapi_record! {
        pub struct WidgetRecord {
            pub uuid: String => "uuid",
            pub size: i64 => "size",
            pub colour: Colour => "colour",
            pub parent: Ref<Widget> => "parent",
            pub tags: Vec<String> => "tags",
        }
    }

    fn record(members: Vec<(&str, Value)>) -> Value {
        Value::Struct(members.into_iter()
                          .map(|(k, v)| (k.to_owned(), v))
                          .collect::<BTreeMap<String, Value>>())
    }

    #[test]
    fn ints_travel_as_strings() {
        assert_eq!(42i64.to_value(), Value::from("42"));
        assert_eq!(i64::from_value(Value::from("-7")).unwrap(), -7);
        assert_eq!(i64::from_value(Value::Int(3)).unwrap(), 3);
        assert!(i64::from_value(Value::from("seven")).is_err());
    }

    #[test]
    fn maps_key_on_strings() {
        let mut map = HashMap::new();
        map.insert(1i64, 0.5f64);
        let value = map.to_value();

        assert_eq!(value.get("1"), Some(&Value::Double(0.5)));
        assert_eq!(HashMap::<i64, f64>::from_value(value).unwrap(), map);
    }

    #[test]
    fn option_is_nil() {
        assert_eq!(Option::<String>::from_value(Value::Nil).unwrap(), None);
        assert_eq!(Option::<String>::from_value(Value::from("x")).unwrap(),
                   Some(String::from("x")));
        assert_eq!(None::<String>.to_value(), Value::Nil);
    }

    #[test]
    fn refs() {
        let r = Ref::<Widget>::from_value(Value::from("OpaqueRef:1234")).unwrap();

        assert_eq!(r.as_str(), "OpaqueRef:1234");
        assert!(!r.is_null());
        assert!(Ref::<Widget>::null().is_null());
        assert!(Ref::<Widget>::default().is_null());
        assert_eq!(r.to_value(), Value::from("OpaqueRef:1234"));
        assert!(Ref::<Widget>::from_value(Value::Int(1)).is_err());
    }

    #[test]
    fn enums() {
        assert_eq!(Colour::from_wire("red"), Colour::Red);
        assert_eq!(Colour::from_wire("Dark_Blue"), Colour::DarkBlue);
        assert_eq!(Colour::from_wire("mauve"),
                   Colour::Unrecognized(String::from("mauve")));
        assert_eq!(Colour::DarkBlue.to_string(), "dark_blue");
        assert_eq!(Colour::from_value(Value::from("red")).unwrap(), Colour::Red);
        assert!(Colour::from_value(Value::Boolean(true)).is_err());
    }

    #[test]
    fn record_decodes() {
        let value = record(vec![("uuid", Value::from("a-b-c")),
                                ("size", Value::from("1024")),
                                ("colour", Value::from("red")),
                                ("parent", Value::from("OpaqueRef:p")),
                                ("tags", Value::Array(vec![Value::from("t")])),
                                ("added_in_a_later_release", Value::Boolean(true))]);

        let rec = WidgetRecord::from_value(value).unwrap();
        assert_eq!(rec.uuid, "a-b-c");
        assert_eq!(rec.size, 1024);
        assert_eq!(rec.colour, Colour::Red);
        assert_eq!(rec.parent, Ref::new("OpaqueRef:p"));
        assert_eq!(rec.tags, vec![String::from("t")]);
    }

    #[test]
    fn record_missing_fields_default() {
        let rec = WidgetRecord::from_value(record(vec![("uuid", Value::from("x"))])).unwrap();

        assert_eq!(rec.size, 0);
        assert!(rec.parent.is_null());
        assert!(rec.tags.is_empty());
    }

    #[test]
    fn record_names_bad_field() {
        let err = WidgetRecord::from_value(record(vec![("size", Value::Boolean(true))]))
            .unwrap_err();

        match err {
            Error::Decode(msg) => assert!(msg.starts_with("WidgetRecord.size:"), "{}", msg),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn record_encodes() {
        let rec = WidgetRecord {
            uuid: String::from("u"),
            size: 5,
            colour: Colour::DarkBlue,
            parent: Ref::null(),
            tags: vec![],
        };
        let value = rec.to_value();

        assert_eq!(value.get("size"), Some(&Value::from("5")));
        assert_eq!(value.get("colour"), Some(&Value::from("dark_blue")));
        assert_eq!(value.get("parent"), Some(&Value::from("OpaqueRef:NULL")));
        assert_eq!(WidgetRecord::from_value(value).unwrap(), rec);
    }

    #[test]
    fn params_macro() {
        let parent = Ref::<Widget>::new("OpaqueRef:p");
        let params = params![parent, "label", 3i64, true];

        assert_eq!(params,
                   vec![Value::from("OpaqueRef:p"),
                        Value::from("label"),
                        Value::from("3"),
                        Value::Boolean(true)]);
        assert!(params![].is_empty());
    }
}
