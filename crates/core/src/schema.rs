//! Re-reads serialized documents and checks them against the rules of
//! `xsd/skeleton.xsd` and `xsd/index.xsd`.

use crate::error::SchemaError;
use crate::index::INDEX_SCHEMA;
use crate::xml::SKELETON_SCHEMA;
use classpeek_api::{CONSTRUCTOR_MARKER, OpCode};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashSet;

pub const SKELETON_XSD: &str = include_str!("../xsd/skeleton.xsd");
pub const INDEX_XSD: &str = include_str!("../xsd/index.xsd");

/// Schema files written next to every run's output, as `(path, contents)`.
pub const SCHEMA_FILES: [(&str, &str); 2] =
    [(SKELETON_SCHEMA, SKELETON_XSD), (INDEX_SCHEMA, INDEX_XSD)];

#[derive(Debug, Default)]
struct Node {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<Node>,
}

impl Node {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }
}

struct Checker<'d> {
    document: &'d str,
}

impl Checker<'_> {
    fn fail(&self, reason: impl Into<String>) -> SchemaError {
        SchemaError::Invalid {
            document: self.document.to_string(),
            reason: reason.into(),
        }
    }

    fn parse(&self, xml: &str) -> Result<Node, SchemaError> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Node> = Vec::new();
        let mut root: Option<Node> = None;
        loop {
            let event = reader
                .read_event()
                .map_err(|e| self.fail(format!("not well-formed: {e}")))?;
            match event {
                Event::Start(start) => stack.push(self.open(&start)?),
                Event::Empty(start) => {
                    let node = self.open(&start)?;
                    self.attach(&mut stack, &mut root, node)?;
                }
                Event::End(_) => {
                    let node = stack
                        .pop()
                        .ok_or_else(|| self.fail("unbalanced end tag"))?;
                    self.attach(&mut stack, &mut root, node)?;
                }
                Event::Text(text) => {
                    let text = text
                        .unescape()
                        .map_err(|e| self.fail(format!("bad text: {e}")))?;
                    match stack.last_mut() {
                        Some(node) => node.text.push_str(&text),
                        None if text.trim().is_empty() => {}
                        None => return Err(self.fail("text outside the root element")),
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }
        if !stack.is_empty() {
            return Err(self.fail("unclosed elements at end of document"));
        }
        root.ok_or_else(|| self.fail("no root element"))
    }

    fn open(&self, start: &BytesStart<'_>) -> Result<Node, SchemaError> {
        let mut node = Node {
            name: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            ..Node::default()
        };
        for attribute in start.attributes() {
            let attribute = attribute.map_err(|e| self.fail(format!("bad attribute: {e}")))?;
            let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
            let value = attribute
                .unescape_value()
                .map_err(|e| self.fail(format!("bad attribute value: {e}")))?
                .into_owned();
            node.attributes.push((key, value));
        }
        Ok(node)
    }

    fn attach(
        &self,
        stack: &mut [Node],
        root: &mut Option<Node>,
        node: Node,
    ) -> Result<(), SchemaError> {
        match stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None if root.is_none() => *root = Some(node),
            None => return Err(self.fail("more than one root element")),
        }
        Ok(())
    }

    fn required<'n>(&self, node: &'n Node, key: &str) -> Result<&'n str, SchemaError> {
        match node.attr(key) {
            Some(value) => Ok(value),
            None => Err(self.fail(format!("<{}> lacks attribute {key}", node.name))),
        }
    }

    fn non_empty<'n>(&self, node: &'n Node, key: &str) -> Result<&'n str, SchemaError> {
        let value = self.required(node, key)?;
        if value.is_empty() {
            return Err(self.fail(format!("<{}> has an empty {key}", node.name)));
        }
        Ok(value)
    }

    fn boolean(&self, node: &Node, key: &str) -> Result<bool, SchemaError> {
        match self.required(node, key)? {
            "true" => Ok(true),
            "false" => Ok(false),
            other => Err(self.fail(format!("<{}> {key}={other:?} is not a boolean", node.name))),
        }
    }

    fn double(&self, node: &Node, key: &str) -> Result<(), SchemaError> {
        let value = self.required(node, key)?;
        if is_double(value) {
            Ok(())
        } else {
            Err(self.fail(format!("<{}> {key}={value:?} is not a double", node.name)))
        }
    }

    fn only(&self, node: &Node, allowed: &[&str]) -> Result<(), SchemaError> {
        match node.children.iter().find(|c| !allowed.contains(&c.name.as_str())) {
            Some(child) => Err(self.fail(format!(
                "unexpected <{}> inside <{}>",
                child.name, node.name
            ))),
            None => Ok(()),
        }
    }

    fn single<'n>(&self, node: &'n Node, name: &'n str) -> Result<&'n Node, SchemaError> {
        let mut found = node.children_named(name);
        match (found.next(), found.next()) {
            (Some(child), None) => Ok(child),
            (None, _) => Err(self.fail(format!("<{}> lacks <{name}>", node.name))),
            (Some(_), Some(_)) => Err(self.fail(format!("<{}> has more than one <{name}>", node.name))),
        }
    }
}

/// Checks a skeleton document, either per-unit or combined.
pub fn validate_skeleton(document: &str, xml: &str) -> Result<(), SchemaError> {
    let checker = Checker { document };
    let root = checker.parse(xml)?;
    if root.name != "skeleton" {
        return Err(checker.fail(format!("root is <{}>, expected <skeleton>", root.name)));
    }
    let schema = checker.required(&root, "schema")?;
    if schema != SKELETON_SCHEMA {
        return Err(checker.fail(format!("schema is {schema:?}, expected {SKELETON_SCHEMA:?}")));
    }
    checker.only(&root, &["app"])?;
    let app = checker.single(&root, "app")?;
    checker.only(app, &["package"])?;

    let mut class_ids = HashSet::new();
    for package in &app.children {
        checker.required(package, "id")?;
        checker.only(package, &["class"])?;
        for class in &package.children {
            let id = checker.non_empty(class, "id")?;
            if !class_ids.insert(id) {
                return Err(checker.fail(format!("class {id} appears twice")));
            }
            check_class(&checker, class)?;
        }
    }
    Ok(())
}

fn check_class(checker: &Checker<'_>, class: &Node) -> Result<(), SchemaError> {
    checker.only(class, &["attributes", "methods"])?;
    if class.children_named("attributes").count() > 1 {
        return Err(checker.fail("more than one <attributes>"));
    }
    for attributes in class.children_named("attributes") {
        checker.only(attributes, &["attribute"])?;
        let mut names = HashSet::new();
        for attribute in &attributes.children {
            let name = checker.non_empty(attribute, "name")?;
            if !names.insert(name) {
                return Err(checker.fail(format!("attribute {name} declared twice")));
            }
            descriptor(checker, checker.required(attribute, "type")?, false)?;
            checker.boolean(attribute, "public")?;
            checker.boolean(attribute, "static")?;
        }
    }

    let methods = checker.single(class, "methods")?;
    checker.only(methods, &["method"])?;
    let mut keys = HashSet::new();
    for method in &methods.children {
        let name = checker.non_empty(method, "name")?;
        let ctor = checker.boolean(method, "ctor")?;
        if ctor != (name == CONSTRUCTOR_MARKER) {
            return Err(checker.fail(format!("method {name} has ctor={ctor}")));
        }
        checker.boolean(method, "public")?;
        checker.only(method, &["args", "return", "ops"])?;

        let args = checker.single(method, "args")?;
        checker.only(args, &["arg"])?;
        let mut key = format!("{name}(");
        for arg in &args.children {
            let ty = checker.required(arg, "type")?;
            descriptor(checker, ty, false)?;
            key.push_str(ty);
            key.push(';');
        }
        let ret = checker.single(method, "return")?;
        descriptor(checker, ret.text.trim(), true)?;
        key.push(')');
        key.push_str(ret.text.trim());
        if !keys.insert(key) {
            return Err(checker.fail(format!("method {name} with the same descriptor appears twice")));
        }

        let ops = checker.single(method, "ops")?;
        checker.only(ops, &["op"])?;
        for op in &ops.children {
            let code = checker.required(op, "code")?;
            if OpCode::parse(code).is_none() {
                return Err(checker.fail(format!("op code {code:?} is not one of {:?}", OpCode::ALL)));
            }
            if op.text.trim().is_empty() {
                return Err(checker.fail(format!("empty {code} target in {name}")));
            }
        }
    }
    Ok(())
}

fn descriptor(checker: &Checker<'_>, raw: &str, allow_void: bool) -> Result<(), SchemaError> {
    let element = raw.trim_start_matches('[');
    let is_array = element.len() != raw.len();
    let valid = match element {
        "V" => allow_void && !is_array,
        "B" | "C" | "D" | "F" | "I" | "J" | "S" | "Z" => true,
        reference => reference.len() > 1 && reference.starts_with('L'),
    };
    if valid {
        Ok(())
    } else {
        Err(checker.fail(format!("{raw:?} is not a type descriptor")))
    }
}

fn is_double(value: &str) -> bool {
    matches!(value, "NaN" | "INF" | "-INF")
        || (value.parse::<f64>().is_ok_and(f64::is_finite))
}

/// Checks an index document; every metric needs at least one entry.
pub fn validate_index(document: &str, xml: &str) -> Result<(), SchemaError> {
    let checker = Checker { document };
    let root = checker.parse(xml)?;
    if root.name != "index" {
        return Err(checker.fail(format!("root is <{}>, expected <index>", root.name)));
    }
    let location = checker.required(&root, "xsi:noNamespaceSchemaLocation")?;
    if location != INDEX_SCHEMA {
        return Err(checker.fail(format!("schema is {location:?}, expected {INDEX_SCHEMA:?}")));
    }
    checker.non_empty(&root, "version")?;
    checker.only(&root, &["metric", "failure"])?;

    let mut seen_failure = false;
    let mut metric_names = HashSet::new();
    for child in &root.children {
        if child.name == "failure" {
            seen_failure = true;
            checker.non_empty(child, "unit")?;
            continue;
        }
        if seen_failure {
            return Err(checker.fail("<metric> after <failure>"));
        }
        let name = checker.non_empty(child, "name")?;
        if !metric_names.insert(name) {
            return Err(checker.fail(format!("metric {name} appears twice")));
        }
        for key in ["min", "max", "mean"] {
            checker.double(child, key)?;
        }
        let classes = checker.required(child, "classes")?;
        if classes.parse::<usize>().is_err() {
            return Err(checker.fail(format!("metric {name} classes={classes:?}")));
        }
        checker.only(child, &["class"])?;
        if child.children.is_empty() {
            return Err(checker.fail(format!("metric {name} has no entries")));
        }
        let mut ids = HashSet::new();
        for entry in &child.children {
            let id = checker.non_empty(entry, "id")?;
            if !ids.insert(id) {
                return Err(checker.fail(format!("class {id} appears twice in {name}")));
            }
            checker.double(entry, "value")?;
        }
    }
    if metric_names.is_empty() {
        return Err(checker.fail("no metrics"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SKELETON: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<skeleton schema="xsd/skeleton.xsd">
  <app>
    <package id="p">
      <class id="p.Foo">
        <methods>
          <method name="&lt;init&gt;" ctor="true" public="true">
            <args/>
            <return>V</return>
            <ops><op code="call">java.lang.Object.&lt;init&gt;</op></ops>
          </method>
          <method name="run" ctor="false" public="false">
            <args><arg type="[I"/></args>
            <return>Ljava/lang/String</return>
            <ops/>
          </method>
        </methods>
      </class>
    </package>
  </app>
</skeleton>"#;

    const INDEX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<index xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:noNamespaceSchemaLocation="xsd/index.xsd" version="0.1.0">
  <metric name="LCOM" min="NaN" max="NaN" mean="NaN" classes="0">
    <class id="*" value="NaN"/>
  </metric>
  <failure unit="Bad.class">truncated</failure>
</index>"#;

    #[test]
    fn test_valid_documents_pass() {
        validate_skeleton("skeleton.xml", SKELETON).unwrap();
        validate_index("index.xml", INDEX).unwrap();
    }

    #[test]
    fn test_bad_op_code_rejected() {
        let xml = SKELETON.replace("code=\"call\"", "code=\"jump\"");
        let err = validate_skeleton("skeleton.xml", &xml).unwrap_err();
        assert!(err.to_string().contains("jump"));
    }

    #[test]
    fn test_ctor_flag_must_match_name() {
        let xml = SKELETON.replace("ctor=\"false\"", "ctor=\"true\"");
        assert!(validate_skeleton("skeleton.xml", &xml).is_err());
    }

    #[test]
    fn test_duplicate_method_key_rejected() {
        let xml = SKELETON.replace("name=\"run\"", "name=\"&lt;init&gt;\"");
        let xml = xml.replace("ctor=\"false\"", "ctor=\"true\"");
        // different descriptors, still fine
        validate_skeleton("skeleton.xml", &xml).unwrap();
        let xml = xml
            .replace("<args><arg type=\"[I\"/></args>", "<args/>")
            .replace("<return>Ljava/lang/String</return>", "<return>V</return>");
        assert!(validate_skeleton("skeleton.xml", &xml).is_err());
    }

    #[test]
    fn test_index_rules() {
        let empty_metric = INDEX.replace("<class id=\"*\" value=\"NaN\"/>", "");
        assert!(validate_index("index.xml", &empty_metric).is_err());

        let bad_value = INDEX.replace("value=\"NaN\"", "value=\"high\"");
        assert!(validate_index("index.xml", &bad_value).is_err());

        let wrong_schema = INDEX.replace("xsd/index.xsd", "index.xsd");
        assert!(validate_index("index.xml", &wrong_schema).is_err());

        assert!(validate_index("index.xml", SKELETON).is_err());
        assert!(validate_index("index.xml", "<index").is_err());
    }

    #[test]
    fn test_void_only_as_return() {
        let xml = SKELETON.replace("type=\"[I\"", "type=\"V\"");
        assert!(validate_skeleton("skeleton.xml", &xml).is_err());
    }
}
