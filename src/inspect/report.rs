//! Rendering of [`TableSummary`] to stdout.

use anyhow::Result;

use super::TableSummary;

/// Print the human-readable summary, mirroring the converter's own
/// end-of-run report plus a column listing.
pub fn print_summary(summary: &TableSummary) {
    println!();
    println!("Summary for {}:", summary.article);
    println!("Table file: {}", summary.path.display());
    println!("Total revisions: {}", summary.rows);
    match (summary.first_edit, summary.last_edit) {
        (Some(first), Some(last)) => println!("Date range: {first} to {last}"),
        _ => println!("Date range: <no timestamps>"),
    }
    if let Some(n) = summary.unique_contributors {
        println!("Unique contributors: {n}");
    }
    if let Some(avg) = summary.avg_text_length {
        println!("Average text length: {avg:.1} characters");
    }
    if let Some(bytes) = summary.text_bytes {
        println!(
            "Text content size: {:.1} MB",
            bytes as f64 / (1024.0 * 1024.0)
        );
    }
    println!();
    println!("Columns:");
    for col in &summary.columns {
        println!(
            "- {:<30} | {:<26} | nulls: {}",
            col.name, col.data_type, col.null_count
        );
    }
}

/// Emit the summary as pretty-printed JSON.
pub fn print_json(summary: &TableSummary) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_serializes_to_json() -> Result<()> {
        let summary = TableSummary {
            article: "Serbia".to_string(),
            path: "dataframes/Serbia.feather".into(),
            rows: 2,
            columns: vec![],
            first_edit: None,
            last_edit: None,
            unique_contributors: Some(2),
            avg_text_length: Some(1.5),
            text_bytes: None,
        };
        let json = serde_json::to_value(&summary)?;
        assert_eq!(json["article"], "Serbia");
        assert_eq!(json["rows"], 2);
        assert_eq!(json["unique_contributors"], 2);
        assert!(json["first_edit"].is_null());
        Ok(())
    }
}
