use std::path::Path;

use formschema::LabelMatchOptions;
use formschema::formschema_core::{heuristic_type, rank_label_candidates};

use crate::shared::{open_form, resolve_pages};

pub fn run(file: &Path, pages: Option<&str>, max_distance: f64, top_k: usize) -> Result<(), i32> {
    let doc = open_form(file)?;
    let selected = resolve_pages(pages, doc.page_count())?;
    let options = LabelMatchOptions {
        max_distance,
        top_k,
        ..LabelMatchOptions::default()
    };
    let runs = doc.text_runs();

    println!("page\tname\ttype\theuristic_type\trank\tscore\tcandidate");
    for field in doc.fields().iter().filter(|f| selected.contains(&f.page)) {
        let candidates = rank_label_candidates(field.bbox.as_ref(), field.page, &runs, &options);
        let nearby: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
        let heuristic = heuristic_type(field.field_type, &field.name, &nearby);

        if candidates.is_empty() {
            println!(
                "{}\t{}\t{}\t{}\t\t\t",
                field.page, field.name, field.field_type, heuristic
            );
            continue;
        }
        for (rank, candidate) in candidates.iter().enumerate() {
            println!(
                "{}\t{}\t{}\t{}\t{}\t{:.2}\t{}",
                field.page,
                field.name,
                field.field_type,
                heuristic,
                rank + 1,
                candidate.score,
                candidate.text,
            );
        }
    }
    Ok(())
}
