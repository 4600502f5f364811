//! Shared helpers: build form PDFs in memory with lopdf.

#![allow(dead_code)]

use lopdf::{Dictionary, Object, Stream, dictionary};

/// One widget on a page: name, `/FT`, `/Ff`, and `[x0 y0 x1 y1]`.
pub struct Widget {
    pub name: &'static str,
    pub ft: &'static str,
    pub flags: i64,
    pub rect: [i64; 4],
}

impl Widget {
    pub fn text(name: &'static str, rect: [i64; 4]) -> Self {
        Self {
            name,
            ft: "Tx",
            flags: 0,
            rect,
        }
    }

    pub fn checkbox(name: &'static str, rect: [i64; 4]) -> Self {
        Self {
            name,
            ft: "Btn",
            flags: 0,
            rect,
        }
    }

    fn to_dict(&self) -> Dictionary {
        let mut dict = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "T" => Object::string_literal(self.name),
            "FT" => self.ft,
            "Rect" => self.rect.iter().map(|v| Object::Integer(*v)).collect::<Vec<_>>(),
        };
        if self.flags != 0 {
            dict.set("Ff", Object::Integer(self.flags));
        }
        dict
    }
}

/// One page: content stream text plus widgets.
pub struct PageSpec {
    pub content: &'static [u8],
    pub widgets: Vec<Widget>,
}

/// Build a form PDF and return its bytes.
pub fn form_pdf(pages: Vec<PageSpec>) -> Vec<u8> {
    let mut doc = lopdf::Document::with_version("1.5");

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    let mut all_fields = Vec::new();
    for page in pages {
        let content_id = doc.add_object(Stream::new(dictionary! {}, page.content.to_vec()));
        let annots: Vec<Object> = page
            .widgets
            .iter()
            .map(|w| {
                let id = doc.add_object(w.to_dict());
                all_fields.push(Object::Reference(id));
                Object::Reference(id)
            })
            .collect();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(pages_id),
            "MediaBox" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(612), Object::Integer(792)],
            "Contents" => Object::Reference(content_id),
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => Object::Reference(font_id) },
            },
            "Annots" => annots,
        });
        kids.push(Object::Reference(page_id));
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(count),
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => Object::Reference(pages_id),
        "AcroForm" => dictionary! { "Fields" => all_fields },
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut buf = Vec::new();
    doc.save_to(&mut buf).unwrap();
    buf
}

/// Three labeled fields on page 1 and two on page 2.
///
/// Rows sit 160 units apart so each field only sees its own label.
pub fn two_page_application() -> Vec<u8> {
    form_pdf(vec![
        PageSpec {
            content: b"BT /F1 18 Tf 300 770 Td (Employee Application) Tj ET \
                       BT /F1 10 Tf 72 705 Td (Full Name:) Tj ET \
                       BT /F1 10 Tf 72 545 Td (Date of Birth:) Tj ET \
                       BT /F1 10 Tf 72 385 Td (Email:) Tj ET",
            widgets: vec![
                Widget::text("full_name", [125, 703, 225, 717]),
                Widget::text("dob", [150, 543, 250, 557]),
                Widget::text("email", [110, 383, 210, 397]),
            ],
        },
        PageSpec {
            content: b"BT /F1 10 Tf 72 705 Td (I agree to the terms) Tj ET \
                       BT /F1 10 Tf 72 545 Td (Signature:) Tj ET",
            widgets: vec![
                Widget::checkbox("agree_terms", [200, 702, 212, 714]),
                Widget::text("applicant_sig", [130, 540, 330, 560]),
            ],
        },
    ])
}
