//! Loop item and repeated-field rendering tests

use super::helpers::shop;
use crate::value::{Object, ObjectKind};
use super::*;

fn row(fields: &[(&str, Value)]) -> Row {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

fn names(values: &[&str]) -> Vec<Row> {
    values.iter().map(|n| row(&[("name", Value::from(*n))])).collect()
}

#[test]
fn test_render_loop_with_header_and_footer() {
    let (processor, _) = shop();
    let template = LoopTemplate::new("<li>%row:name%</li>")
        .with_header("<ul>")
        .with_footer("</ul>");
    let out = processor.render_loop(&template, &names(&["A", "B"]), 1);
    assert_eq!(out, "<ul><li>A</li><li>B</li></ul>");
}

#[test]
fn test_render_loop_without_rows() {
    let (processor, _) = shop();
    let template = LoopTemplate::new("<li>%row:name%</li>")
        .with_header("<ul>")
        .with_footer("</ul>");
    assert_eq!(processor.render_loop(&template, &[], 1), "<ul></ul>");
}

#[test]
fn test_header_and_footer_see_record_fields() {
    let (processor, _) = shop();
    let template = LoopTemplate::new("%row:name%;")
        .with_header("%native:title%: ")
        .with_footer(" (%custom:price%)");
    assert_eq!(processor.render_loop(&template, &names(&["x", "y"]), 1), "Hello: x;y; (75)");
}

#[test]
fn test_loop_item_mixes_row_and_record_fields() {
    let (processor, _) = shop();
    let item = row(&[("qty", Value::Int(3)), ("label", Value::from("socks"))]);
    let out = processor.process_loop_item("%row:qty% x %row:label|upper% for %native:title%", &item, 1);
    assert_eq!(out, "3 x SOCKS for Hello");
}

#[test]
fn test_loop_item_conditionals_and_fallbacks() {
    let (processor, _) = shop();
    let template = "[if:%row:qty% > 1]%row:qty% pcs[else]single[/if] %row:note%[fallback]-[/fallback]";
    let many = row(&[("qty", Value::Int(2)), ("note", Value::from("gift"))]);
    let one = row(&[("qty", Value::Int(1))]);
    assert_eq!(processor.process_loop_item(template, &many, 1), "2 pcs gift");
    assert_eq!(processor.process_loop_item(template, &one, 1), "single -");
}

#[test]
fn test_row_property_access() {
    let (processor, _) = shop();
    let image = Value::Object(Object::new(ObjectKind::Attachment).with_field("url", "/a.jpg"));
    let item = row(&[("image", image)]);
    assert_eq!(processor.process_loop_item("%row:image.url%", &item, 1), "/a.jpg");
}

#[test]
fn test_rows_do_not_leak_between_items() {
    let (processor, _) = shop();
    let first = row(&[("name", Value::from("A")), ("extra", Value::from("only A"))]);
    let second = row(&[("name", Value::from("B"))]);
    let template = "%row:name%:%row:extra%";
    assert_eq!(processor.process_loop_item(template, &first, 1), "A:only A");
    assert_eq!(processor.process_loop_item(template, &second, 1), "B:");
}

#[test]
fn test_row_tags_outside_loop_are_empty() {
    let (processor, _) = shop();
    assert_eq!(processor.process("[%row:name%]", 1), "[]");
}

#[test]
fn test_row_label_has_no_metadata() {
    let (processor, _) = shop();
    let item = row(&[("name", Value::from("A"))]);
    assert_eq!(processor.process_loop_item("%row:name.label%", &item, 1), "");
}
