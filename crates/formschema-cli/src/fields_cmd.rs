use std::collections::BTreeSet;
use std::path::Path;

use formschema::RawField;

use crate::cli::OutputFormat;
use crate::shared::{csv_escape, open_form, resolve_pages};

pub fn run(file: &Path, pages: Option<&str>, format: &OutputFormat) -> Result<(), i32> {
    let doc = open_form(file)?;
    let selected = resolve_pages(pages, doc.page_count())?;
    let fields = select(doc.fields(), &selected);

    match format {
        OutputFormat::Text => write_text(&fields),
        OutputFormat::Json => write_json(&fields),
        OutputFormat::Csv => write_csv(&fields),
    }
}

/// Keep fields on the selected pages.
///
/// Fields recovered from the `/AcroForm` tree report page 1 even in longer
/// documents, so they follow page 1's selection.
fn select(fields: Vec<RawField>, pages: &BTreeSet<usize>) -> Vec<RawField> {
    fields.into_iter().filter(|f| pages.contains(&f.page)).collect()
}

fn bbox_columns(field: &RawField) -> [String; 4] {
    match field.bbox {
        Some(b) => [
            format!("{:.2}", b.left),
            format!("{:.2}", b.top),
            format!("{:.2}", b.right),
            format!("{:.2}", b.bottom),
        ],
        None => Default::default(),
    }
}

fn write_text(fields: &[RawField]) -> Result<(), i32> {
    println!("page\tname\ttype\tdefault_value\toptions\tgroup\tflags\tleft\ttop\tright\tbottom");

    for field in fields {
        let [left, top, right, bottom] = bbox_columns(field);
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            field.page,
            field.name,
            field.field_type,
            field.default_value.as_deref().unwrap_or(""),
            field.options.join("; "),
            field.radio_group.as_deref().unwrap_or(""),
            field.flags,
            left,
            top,
            right,
            bottom,
        );
    }
    Ok(())
}

fn write_json(fields: &[RawField]) -> Result<(), i32> {
    let json_str = serde_json::to_string(fields).map_err(|e| {
        eprintln!("Error: failed to serialize fields: {e}");
        1
    })?;
    println!("{json_str}");
    Ok(())
}

fn write_csv(fields: &[RawField]) -> Result<(), i32> {
    println!("page,name,type,default_value,options,group,flags,left,top,right,bottom");

    for field in fields {
        let [left, top, right, bottom] = bbox_columns(field);
        println!(
            "{},{},{},{},{},{},{},{},{},{},{}",
            field.page,
            csv_escape(&field.name),
            field.field_type,
            csv_escape(field.default_value.as_deref().unwrap_or("")),
            csv_escape(&field.options.join("; ")),
            csv_escape(field.radio_group.as_deref().unwrap_or("")),
            field.flags,
            left,
            top,
            right,
            bottom,
        );
    }
    Ok(())
}
