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

use error::{Error, Result};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use rustc_serialize::base64::FromBase64;
use std::collections::BTreeMap;
use std::str;
use super::{MethodCall, MethodResponse, Value};

fn name_of(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn start_name(e: &BytesStart) -> String {
    name_of(e.name().as_ref())
}

fn is_blank(bytes: &[u8]) -> bool {
    bytes.iter().all(|b| b" \t\r\n".contains(b))
}

/// A pull parser over one XML-RPC document
struct Parser<'a> {
    reader: Reader<&'a [u8]>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Parser<'a> {
        Parser { reader: Reader::from_str(text) }
    }

    fn error<T>(&self, msg: String) -> Result<T> {
        Err(Error::Xml(format!("{} at byte {}", msg, self.reader.buffer_position())))
    }

    /// Next structural event, skipping blank text, prologs and comments
    fn next(&mut self) -> Result<Event<'a>> {
        loop {
            match self.reader.read_event()? {
                Event::Text(ref t) if is_blank(t) => continue,
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => continue,
                event => return Ok(event),
            }
        }
    }

    fn expect_start(&mut self, name: &str) -> Result<()> {
        match self.next()? {
            Event::Start(ref e) if e.name().as_ref() == name.as_bytes() => Ok(()),
            event => self.error(format!("expected <{}>, found {:?}", name, event)),
        }
    }

    fn expect_end(&mut self, name: &str) -> Result<()> {
        match self.next()? {
            Event::End(ref e) if e.name().as_ref() == name.as_bytes() => Ok(()),
            event => self.error(format!("expected </{}>, found {:?}", name, event)),
        }
    }

    /// Character data up to the closing tag of `name`
    fn text(&mut self, name: &str) -> Result<String> {
        let mut text = String::new();
        loop {
            match self.reader.read_event()? {
                Event::Text(t) => text.push_str(&t.unescape()?),
                Event::CData(c) => {
                    match str::from_utf8(&c) {
                        Ok(s) => text.push_str(s),
                        Err(_) => return self.error(String::from("CDATA is not utf-8")),
                    }
                }
                Event::Comment(_) => {}
                Event::End(ref e) if e.name().as_ref() == name.as_bytes() => return Ok(text),
                event => return self.error(format!("unexpected {:?} inside <{}>", event, name)),
            }
        }
    }

    /// A complete `<value>` element
    fn value(&mut self) -> Result<Value> {
        match self.next()? {
            Event::Start(ref e) if e.name().as_ref() == b"value" => self.value_body(),
            Event::Empty(ref e) if e.name().as_ref() == b"value" => Ok(Value::String(String::new())),
            event => self.error(format!("expected <value>, found {:?}", event)),
        }
    }

    /// The contents of a `<value>` whose start tag has been consumed
    fn value_body(&mut self) -> Result<Value> {
        let mut text = String::new();
        loop {
            match self.reader.read_event()? {
                // a value without a type element is a string
                Event::Text(t) => text.push_str(&t.unescape()?),
                Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c)),
                Event::Comment(_) => {}
                Event::End(ref e) if e.name().as_ref() == b"value" => {
                    return Ok(Value::String(text));
                }
                Event::Start(e) => {
                    let value = self.typed(&start_name(&e))?;
                    self.expect_end("value")?;
                    return Ok(value);
                }
                Event::Empty(e) => {
                    let value = self.typed_empty(&start_name(&e))?;
                    self.expect_end("value")?;
                    return Ok(value);
                }
                event => return self.error(format!("unexpected {:?} inside <value>", event)),
            }
        }
    }

    fn typed(&mut self, name: &str) -> Result<Value> {
        match name {
            "string" => Ok(Value::String(self.text(name)?)),
            "int" | "i4" | "i8" => {
                let text = self.text(name)?;
                match text.trim().parse::<i64>() {
                    Ok(i) => Ok(Value::Int(i)),
                    Err(_) => self.error(format!("bad <{}> {:?}", name, text)),
                }
            }
            "boolean" => {
                let text = self.text(name)?;
                match text.trim() {
                    "1" | "true" => Ok(Value::Boolean(true)),
                    "0" | "false" => Ok(Value::Boolean(false)),
                    other => self.error(format!("bad <boolean> {:?}", other)),
                }
            }
            "double" => {
                let text = self.text(name)?;
                match text.trim().parse::<f64>() {
                    Ok(d) => Ok(Value::Double(d)),
                    Err(_) => self.error(format!("bad <double> {:?}", text)),
                }
            }
            "dateTime.iso8601" => Ok(Value::DateTime(self.text(name)?.trim().to_owned())),
            "base64" => {
                let text = self.text(name)?;
                let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
                match compact.from_base64() {
                    Ok(bytes) => Ok(Value::Base64(bytes)),
                    Err(e) => self.error(format!("bad <base64>: {}", e)),
                }
            }
            "struct" => self.members(),
            "array" => {
                let values = match self.next()? {
                    Event::Start(ref e) if e.name().as_ref() == b"data" => self.elements()?,
                    Event::Empty(ref e) if e.name().as_ref() == b"data" => Vec::new(),
                    event => return self.error(format!("expected <data>, found {:?}", event)),
                };
                self.expect_end("array")?;
                Ok(Value::Array(values))
            }
            "nil" => {
                self.expect_end("nil")?;
                Ok(Value::Nil)
            }
            other => self.error(format!("unknown value type <{}>", other)),
        }
    }

    fn typed_empty(&mut self, name: &str) -> Result<Value> {
        match name {
            "string" => Ok(Value::String(String::new())),
            "base64" => Ok(Value::Base64(Vec::new())),
            "struct" => Ok(Value::Struct(BTreeMap::new())),
            "array" => Ok(Value::Array(Vec::new())),
            "nil" => Ok(Value::Nil),
            other => self.error(format!("<{}/> has no value", other)),
        }
    }

    /// `<member>` elements up to `</struct>`
    fn members(&mut self) -> Result<Value> {
        let mut members = BTreeMap::new();
        loop {
            match self.next()? {
                Event::Start(ref e) if e.name().as_ref() == b"member" => {}
                Event::End(ref e) if e.name().as_ref() == b"struct" => {
                    return Ok(Value::Struct(members));
                }
                event => return self.error(format!("expected <member>, found {:?}", event)),
            }

            let name = match self.next()? {
                Event::Start(ref e) if e.name().as_ref() == b"name" => self.text("name")?,
                Event::Empty(ref e) if e.name().as_ref() == b"name" => String::new(),
                event => return self.error(format!("expected <name>, found {:?}", event)),
            };
            let value = self.value()?;
            self.expect_end("member")?;

            if members.insert(name.clone(), value).is_some() {
                warn!("duplicate struct member {:?}, keeping the last", name);
            }
        }
    }

    /// `<value>` elements up to `</data>`
    fn elements(&mut self) -> Result<Vec<Value>> {
        let mut values = Vec::new();
        loop {
            match self.next()? {
                Event::Start(ref e) if e.name().as_ref() == b"value" => {
                    values.push(self.value_body()?)
                }
                Event::Empty(ref e) if e.name().as_ref() == b"value" => {
                    values.push(Value::String(String::new()))
                }
                Event::End(ref e) if e.name().as_ref() == b"data" => return Ok(values),
                event => return self.error(format!("expected <value>, found {:?}", event)),
            }
        }
    }

    /// Nothing but whitespace may follow the root element
    fn finish(&mut self) -> Result<()> {
        match self.next()? {
            Event::Eof => Ok(()),
            event => self.error(format!("trailing {:?} after document", event)),
        }
    }
}

/// Decode a lone `<value>` fragment, as found in task results
pub fn parse_value(text: &str) -> Result<Value> {
    let mut parser = Parser::new(text);
    let value = parser.value()?;
    parser.finish()?;
    Ok(value)
}

impl MethodCall {
    pub fn parse(text: &str) -> Result<MethodCall> {
        let mut parser = Parser::new(text);
        parser.expect_start("methodCall")?;
        parser.expect_start("methodName")?;
        let name = parser.text("methodName")?;

        let mut params = Vec::new();
        match parser.next()? {
            Event::Start(ref e) if e.name().as_ref() == b"params" => {
                loop {
                    match parser.next()? {
                        Event::Start(ref e) if e.name().as_ref() == b"param" => {
                            params.push(parser.value()?);
                            parser.expect_end("param")?;
                        }
                        Event::End(ref e) if e.name().as_ref() == b"params" => break,
                        event => {
                            return parser.error(format!("expected <param>, found {:?}", event))
                        }
                    }
                }
                parser.expect_end("methodCall")?;
            }
            Event::Empty(ref e) if e.name().as_ref() == b"params" => {
                parser.expect_end("methodCall")?;
            }
            Event::End(ref e) if e.name().as_ref() == b"methodCall" => {}
            event => return parser.error(format!("expected <params>, found {:?}", event)),
        }
        parser.finish()?;

        Ok(MethodCall {
               name: name,
               params: params,
           })
    }
}

impl MethodResponse {
    pub fn parse(text: &str) -> Result<MethodResponse> {
        let mut parser = Parser::new(text);
        parser.expect_start("methodResponse")?;

        let response = match parser.next()? {
            Event::Start(ref e) if e.name().as_ref() == b"params" => {
                parser.expect_start("param")?;
                let value = parser.value()?;
                parser.expect_end("param")?;
                parser.expect_end("params")?;
                MethodResponse::Success(value)
            }
            Event::Start(ref e) if e.name().as_ref() == b"fault" => {
                let value = parser.value()?;
                parser.expect_end("fault")?;
                fault(value)?
            }
            event => {
                return parser.error(format!("expected <params> or <fault>, found {:?}", event))
            }
        };

        parser.expect_end("methodResponse")?;
        parser.finish()?;
        Ok(response)
    }
}

fn fault(value: Value) -> Result<MethodResponse> {
    // some servers send the code as a string
    let code = match value.get("faultCode") {
        Some(&Value::Int(i)) => i,
        Some(&Value::String(ref s)) => s.trim().parse::<i64>().unwrap_or(0),
        _ => return Err(Error::Xml(String::from("fault without a faultCode"))),
    };
    let string = value.get("faultString")
        .and_then(Value::as_str)
        .unwrap_or("")
        .to_owned();

    Ok(MethodResponse::Fault {
           code: code,
           string: string,
       })
}

#[cfg(test)]
mod tests {
    use super::*;
    use xmlrpc::{MethodCall, MethodResponse, Value};

    #[test]
    fn untyped_value_is_string() {
        assert_eq!(parse_value("<value>  OpaqueRef:abc </value>").unwrap(),
                   Value::from("  OpaqueRef:abc "));
        assert_eq!(parse_value("<value/>").unwrap(), Value::from(""));
        assert_eq!(parse_value("<value><string/></value>").unwrap(), Value::from(""));
    }

    #[test]
    fn whitespace_around_types() {
        let xml = "<value>\n  <i4> 12 </i4>\n</value>";
        assert_eq!(parse_value(xml).unwrap(), Value::Int(12));
    }

    #[test]
    fn entities_and_cdata() {
        assert_eq!(parse_value("<value><string>a &lt;b&gt; &#38; c</string></value>").unwrap(),
                   Value::from("a <b> & c"));
        assert_eq!(parse_value("<value><string><![CDATA[<raw>]]></string></value>").unwrap(),
                   Value::from("<raw>"));
    }

    #[test]
    fn scalars() {
        assert_eq!(parse_value("<value><boolean>1</boolean></value>").unwrap(),
                   Value::Boolean(true));
        assert_eq!(parse_value("<value><double>-1.5</double></value>").unwrap(),
                   Value::Double(-1.5));
        assert_eq!(parse_value("<value><dateTime.iso8601>20161129T16:34:02Z</dateTime.iso8601>\
                                </value>")
                           .unwrap(),
                   Value::DateTime(String::from("20161129T16:34:02Z")));
        assert_eq!(parse_value("<value><base64>eGVu\n</base64></value>").unwrap(),
                   Value::Base64(b"xen".to_vec()));
        assert_eq!(parse_value("<value><nil/></value>").unwrap(), Value::Nil);
    }

    #[test]
    fn bad_scalars() {
        assert!(parse_value("<value><int>twelve</int></value>").is_err());
        assert!(parse_value("<value><boolean>yes</boolean></value>").is_err());
        assert!(parse_value("<value><widget>1</widget></value>").is_err());
        assert!(parse_value("<value><int>1</int></value><value/>").is_err());
    }

    #[test]
    fn mismatched_tags() {
        assert!(parse_value("<value><string>a</int></value>").is_err());
    }

    #[test]
    fn success_response() {
        let xml = "<?xml version='1.0'?>\n\
                   <methodResponse>\n\
                     <params>\n\
                       <param>\n\
                         <value><struct>\n\
                           <member><name>Status</name><value>Success</value></member>\n\
                           <member><name>Value</name><value>OpaqueRef:1</value></member>\n\
                         </struct></value>\n\
                       </param>\n\
                     </params>\n\
                   </methodResponse>\n";

        let response = MethodResponse::parse(xml).unwrap();
        let value = match response {
            MethodResponse::Success(value) => value,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(value.get("Status"), Some(&Value::from("Success")));
        assert_eq!(value.get("Value"), Some(&Value::from("OpaqueRef:1")));
    }

    #[test]
    fn fault_response() {
        let xml = "<methodResponse><fault><value><struct>\
                   <member><name>faultCode</name><value><int>4</int></value></member>\
                   <member><name>faultString</name><value><string>Too many parameters\
                   </string></value></member>\
                   </struct></value></fault></methodResponse>";

        assert_eq!(MethodResponse::parse(xml).unwrap(),
                   MethodResponse::Fault {
                       code: 4,
                       string: String::from("Too many parameters"),
                   });
    }

    #[test]
    fn empty_collections() {
        assert_eq!(parse_value("<value><array><data/></array></value>").unwrap(),
                   Value::Array(vec![]));
        assert_eq!(parse_value("<value><struct></struct></value>").unwrap(),
                   Value::Struct(Default::default()));
    }

    #[test]
    fn call_without_params() {
        let call = MethodCall::parse("<methodCall><methodName>pool.get_all</methodName>\
                                      </methodCall>")
                .unwrap();
        assert_eq!(call, MethodCall::new("pool.get_all", vec![]));
    }
}
