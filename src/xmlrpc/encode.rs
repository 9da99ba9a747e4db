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

use quick_xml::escape::escape;
use rustc_serialize::base64::{STANDARD, ToBase64};
use std::i32;
use super::{MethodCall, MethodResponse, Value};

const PROLOG: &'static str = "<?xml version=\"1.0\"?>\n";

/// Append `value` as a `<value>` element
pub fn write_value(out: &mut String, value: &Value) {
    out.push_str("<value>");
    match *value {
        Value::Int(i) => {
            // plain ints are 32-bit, anything wider needs the i8 extension
            let tag = if i >= i32::MIN as i64 && i <= i32::MAX as i64 {
                "int"
            } else {
                "i8"
            };
            out.push_str(&format!("<{}>{}</{}>", tag, i, tag));
        }
        Value::Boolean(b) => {
            out.push_str(if b {
                             "<boolean>1</boolean>"
                         } else {
                             "<boolean>0</boolean>"
                         })
        }
        Value::String(ref s) => {
            out.push_str("<string>");
            out.push_str(&escape(s));
            out.push_str("</string>");
        }
        Value::Double(d) => out.push_str(&format!("<double>{}</double>", d)),
        Value::DateTime(ref s) => {
            out.push_str("<dateTime.iso8601>");
            out.push_str(&escape(s));
            out.push_str("</dateTime.iso8601>");
        }
        Value::Base64(ref bytes) => {
            out.push_str("<base64>");
            out.push_str(&bytes.to_base64(STANDARD));
            out.push_str("</base64>");
        }
        Value::Struct(ref members) => {
            out.push_str("<struct>");
            for (name, member) in members {
                out.push_str("<member><name>");
                out.push_str(&escape(name));
                out.push_str("</name>");
                write_value(out, member);
                out.push_str("</member>");
            }
            out.push_str("</struct>");
        }
        Value::Array(ref values) => {
            out.push_str("<array><data>");
            for v in values {
                write_value(out, v);
            }
            out.push_str("</data></array>");
        }
        Value::Nil => out.push_str("<nil/>"),
    }
    out.push_str("</value>");
}

impl MethodCall {
    /// Render the complete request document
    pub fn to_xml(&self) -> String {
        let mut out = String::from(PROLOG);
        out.push_str("<methodCall><methodName>");
        out.push_str(&escape(&self.name));
        out.push_str("</methodName><params>");
        for param in &self.params {
            out.push_str("<param>");
            write_value(&mut out, param);
            out.push_str("</param>");
        }
        out.push_str("</params></methodCall>");
        out
    }
}

impl MethodResponse {
    /// Render the complete response document
    pub fn to_xml(&self) -> String {
        let mut out = String::from(PROLOG);
        out.push_str("<methodResponse>");
        match *self {
            MethodResponse::Success(ref value) => {
                out.push_str("<params><param>");
                write_value(&mut out, value);
                out.push_str("</param></params>");
            }
            MethodResponse::Fault { code, ref string } => {
                let mut members = ::std::collections::BTreeMap::new();
                members.insert(String::from("faultCode"), Value::Int(code));
                members.insert(String::from("faultString"), Value::String(string.clone()));
                out.push_str("<fault>");
                write_value(&mut out, &Value::Struct(members));
                out.push_str("</fault>");
            }
        }
        out.push_str("</methodResponse>");
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn render(value: &Value) -> String {
        let mut out = String::new();
        write_value(&mut out, value);
        out
    }

    #[test]
    fn scalars() {
        assert_eq!(render(&Value::Int(42)), "<value><int>42</int></value>");
        assert_eq!(render(&Value::Int(1 << 40)),
                   "<value><i8>1099511627776</i8></value>");
        assert_eq!(render(&Value::Boolean(true)),
                   "<value><boolean>1</boolean></value>");
        assert_eq!(render(&Value::Double(0.5)),
                   "<value><double>0.5</double></value>");
        assert_eq!(render(&Value::Base64(b"xen".to_vec())),
                   "<value><base64>eGVu</base64></value>");
        assert_eq!(render(&Value::Nil), "<value><nil/></value>");
    }

    #[test]
    fn strings_are_escaped() {
        assert_eq!(render(&Value::from("<a & b>")),
                   "<value><string>&lt;a &amp; b&gt;</string></value>");
    }

    #[test]
    fn nested() {
        let mut members = BTreeMap::new();
        members.insert(String::from("tags"),
                       Value::Array(vec![Value::from("a"), Value::from("b")]));

        assert_eq!(render(&Value::Struct(members)),
                   "<value><struct><member><name>tags</name><value><array><data>\
                    <value><string>a</string></value><value><string>b</string></value>\
                    </data></array></value></member></struct></value>");
    }

    #[test]
    fn method_call() {
        let call = MethodCall::new("session.logout",
                                   vec![Value::from("OpaqueRef:abc")]);

        assert_eq!(call.to_xml(),
                   "<?xml version=\"1.0\"?>\n<methodCall><methodName>session.logout\
                    </methodName><params><param><value><string>OpaqueRef:abc</string>\
                    </value></param></params></methodCall>");
    }

    #[test]
    fn fault() {
        let fault = MethodResponse::Fault {
            code: 1,
            string: String::from("nope"),
        };
        let xml = fault.to_xml();

        assert!(xml.contains("<fault><value><struct>"));
        assert!(xml.contains("<name>faultCode</name><value><int>1</int></value>"));
        assert!(xml.contains("<name>faultString</name><value><string>nope</string></value>"));
    }
}
