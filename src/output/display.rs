//! Plain-text rendering of a correlation for the terminal

use crate::catalog::Product;
use crate::correlate::Correlation;
use std::fmt::Write;

fn format_product(out: &mut String, product: &Product, indent: &str) {
    let price = match product.price {
        Some(price) => format!("${:.2}", price),
        None => "-".to_string(),
    };
    let _ = write!(out, "{}{}  {}", indent, product.full_name(), price);
    if product.is_sold_out {
        out.push_str("  (sold out)");
    }
    out.push('\n');
}

/// Renders the breakdown per feature, or the product table
pub fn format_correlation(result: &Correlation) -> String {
    let mut out = String::new();

    if result.break_down {
        for (entry, products) in result.breakdown() {
            let _ = writeln!(out, "{} ({} products)", entry.feature.name, products.len());
            for product in products {
                format_product(&mut out, product, "  ");
            }
        }
    } else {
        for product in &result.products {
            format_product(&mut out, product, "");
        }
    }

    let _ = writeln!(
        out,
        "{} features, {} product rows",
        result.features.len(),
        result.products.len()
    );
    out
}

/// Prints the result to stdout
pub fn print_correlation(result: &Correlation) {
    print!("{}", format_correlation(result));
}
