//! Form PDFs built in memory for CLI tests.

#![allow(dead_code)]

use std::io::Write;

use lopdf::{Object, Stream, dictionary};

pub fn cmd() -> assert_cmd::Command {
    assert_cmd::Command::cargo_bin("formschema").unwrap()
}

fn rect(r: [i64; 4]) -> Object {
    Object::Array(r.iter().map(|v| Object::Integer(*v)).collect())
}

/// A two-page form: name and birth date on page 1, a consent checkbox and
/// a state dropdown on page 2.
pub fn sample_form() -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources = dictionary! {
        "Font" => dictionary! { "F1" => Object::Reference(font_id) },
    };
    let pages_id = doc.new_object_id();

    let name_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Tx",
        "T" => Object::string_literal("full_name"),
        "Rect" => rect([125, 703, 225, 717]),
    });
    let dob_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Tx",
        "T" => Object::string_literal("dob"),
        "Rect" => rect([150, 543, 250, 557]),
    });
    let content1 = doc.add_object(Stream::new(
        dictionary! {},
        b"BT /F1 10 Tf 72 705 Td (Full Name:) Tj ET BT /F1 10 Tf 72 545 Td (Date of Birth:) Tj ET"
            .to_vec(),
    ));
    let page1 = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => Object::Reference(pages_id),
        "MediaBox" => rect([0, 0, 612, 792]),
        "Contents" => Object::Reference(content1),
        "Resources" => resources.clone(),
        "Annots" => vec![Object::Reference(name_id), Object::Reference(dob_id)],
    });

    let agree_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Btn",
        "T" => Object::string_literal("agree_terms"),
        "Rect" => rect([200, 702, 212, 714]),
    });
    let state_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Ch",
        "T" => Object::string_literal("state"),
        "Opt" => vec![
            Object::Array(vec![Object::string_literal("CA"), Object::string_literal("California")]),
            Object::Array(vec![Object::string_literal("NV"), Object::string_literal("Nevada, USA")]),
        ],
        "V" => Object::string_literal("CA"),
        "Rect" => rect([150, 543, 250, 557]),
    });
    let content2 = doc.add_object(Stream::new(
        dictionary! {},
        b"BT /F1 10 Tf 72 705 Td (I agree to the terms) Tj ET BT /F1 10 Tf 72 545 Td (State:) Tj ET"
            .to_vec(),
    ));
    let page2 = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => Object::Reference(pages_id),
        "MediaBox" => rect([0, 0, 612, 792]),
        "Contents" => Object::Reference(content2),
        "Resources" => resources,
        "Annots" => vec![Object::Reference(agree_id), Object::Reference(state_id)],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page1), Object::Reference(page2)],
            "Count" => Object::Integer(2),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Write `bytes` to `name` inside `dir` and return the path as a string.
pub fn write_pdf(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> String {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(bytes).unwrap();
    path.to_str().unwrap().to_string()
}
