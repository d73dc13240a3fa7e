use super::{SKELETON_SCHEMA, XmlWriter, finish, flag, new_writer, write_text_element};
use crate::error::Result;
use classpeek_api::{ClassSkeleton, MethodSkeleton};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use std::collections::BTreeMap;

/// One document holding every class, grouped by package. Packages and the
/// classes inside them are sorted by id.
pub fn skeleton_document<'a>(classes: impl IntoIterator<Item = &'a ClassSkeleton>) -> Result<String> {
    let mut packages: BTreeMap<&str, Vec<&ClassSkeleton>> = BTreeMap::new();
    for class in classes {
        packages.entry(class.package()).or_default().push(class);
    }
    for members in packages.values_mut() {
        members.sort_by(|a, b| a.id().cmp(b.id()));
    }

    let mut writer = new_writer()?;
    let mut root = BytesStart::new("skeleton");
    root.push_attribute(("schema", SKELETON_SCHEMA));
    writer.write_event(Event::Start(root))?;
    writer.write_event(Event::Start(BytesStart::new("app")))?;
    for (package, members) in packages {
        let mut element = BytesStart::new("package");
        element.push_attribute(("id", package));
        writer.write_event(Event::Start(element))?;
        for class in members {
            write_class(&mut writer, class)?;
        }
        writer.write_event(Event::End(BytesEnd::new("package")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("app")))?;
    writer.write_event(Event::End(BytesEnd::new("skeleton")))?;
    finish(writer)
}

/// The per-unit document: the same shape with a single class.
pub fn class_document(class: &ClassSkeleton) -> Result<String> {
    skeleton_document(std::iter::once(class))
}

fn write_class(writer: &mut XmlWriter, class: &ClassSkeleton) -> Result<()> {
    let mut element = BytesStart::new("class");
    element.push_attribute(("id", class.id()));
    writer.write_event(Event::Start(element))?;

    if !class.attributes().is_empty() {
        writer.write_event(Event::Start(BytesStart::new("attributes")))?;
        for attribute in class.attributes() {
            let descriptor = attribute.type_id.descriptor();
            let mut element = BytesStart::new("attribute");
            element.push_attribute(("name", attribute.name.as_str()));
            element.push_attribute(("type", descriptor.as_str()));
            element.push_attribute(("public", flag(attribute.is_public)));
            element.push_attribute(("static", flag(attribute.is_static)));
            writer.write_event(Event::Empty(element))?;
        }
        writer.write_event(Event::End(BytesEnd::new("attributes")))?;
    }

    writer.write_event(Event::Start(BytesStart::new("methods")))?;
    for method in class.methods() {
        write_method(writer, method)?;
    }
    writer.write_event(Event::End(BytesEnd::new("methods")))?;
    writer.write_event(Event::End(BytesEnd::new("class")))?;
    Ok(())
}

fn write_method(writer: &mut XmlWriter, method: &MethodSkeleton) -> Result<()> {
    let mut element = BytesStart::new("method");
    element.push_attribute(("name", method.name()));
    element.push_attribute(("ctor", flag(method.is_constructor())));
    element.push_attribute(("public", flag(method.is_public())));
    writer.write_event(Event::Start(element))?;

    if method.args().is_empty() {
        writer.write_event(Event::Empty(BytesStart::new("args")))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new("args")))?;
        for arg in method.args() {
            let descriptor = arg.descriptor();
            let mut element = BytesStart::new("arg");
            element.push_attribute(("type", descriptor.as_str()));
            writer.write_event(Event::Empty(element))?;
        }
        writer.write_event(Event::End(BytesEnd::new("args")))?;
    }

    write_text_element(
        writer,
        BytesStart::new("return"),
        &method.return_type().descriptor(),
    )?;

    if method.ops().is_empty() {
        writer.write_event(Event::Empty(BytesStart::new("ops")))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new("ops")))?;
        for op in method.ops() {
            let mut element = BytesStart::new("op");
            element.push_attribute(("code", op.code.as_str()));
            write_text_element(writer, element, &op.target)?;
        }
        writer.write_event(Event::End(BytesEnd::new("ops")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("method")))?;
    Ok(())
}
