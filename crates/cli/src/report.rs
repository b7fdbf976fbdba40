//! Human-readable run summaries

use std::path::Path;

/// Counts shown in a summary report
#[derive(Debug, Clone, Default)]
pub struct Summary {
    pub total: usize,
    pub kept: usize,
    pub duplicates: usize,
    pub invalid: usize,
    pub dates_cleared: usize,
}

/// Print a formatted summary report
pub fn print_summary_report(title: &str, input: &Path, output: Option<&Path>, summary: &Summary) {
    println!("\n{}", "═".repeat(60));
    println!("{}", title);
    println!("{}", "═".repeat(60));
    println!("Input:              {}", input.display());

    if let Some(output_path) = output {
        println!("Output:             {}", output_path.display());
    } else {
        println!("Output:             (dry run - no output written)");
    }

    println!("Total rows:         {}", format_with_commas(summary.total));

    if summary.dates_cleared > 0 {
        println!("Dates cleared:      {}", format_with_commas(summary.dates_cleared));
    }

    if summary.invalid > 0 {
        println!(
            "Invalid rows:       {} ({:.1}%)",
            format_with_commas(summary.invalid),
            percent(summary.invalid, summary.total)
        );
    }

    if summary.duplicates > 0 {
        println!(
            "Duplicates removed: {} ({:.1}%)",
            format_with_commas(summary.duplicates),
            percent(summary.duplicates, summary.total)
        );
    }

    println!(
        "Final table:        {} ({:.1}%)",
        format_with_commas(summary.kept),
        percent(summary.kept, summary.total)
    );

    println!("{}", "═".repeat(60));
}

fn percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        (part as f64 / total as f64) * 100.0
    }
}

/// Format number with thousand separators
pub fn format_with_commas(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
