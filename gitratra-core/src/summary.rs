//! Console summary formatting
//!
//! Renders per-repository totals over every recorded day. Pure string
//! formatting so the totals are unit-testable; the binary decides where the
//! text goes.

use crate::types::{MetricData, TrafficData};

fn totals(data: &MetricData) -> (u64, u64) {
    data.values()
        .fold((0, 0), |(count, uniques), sample| {
            (count + sample.count, uniques + sample.uniques)
        })
}

/// Render the end-of-run summary for every repository in store order.
pub fn render(store: &TrafficData) -> String {
    let mut out = String::new();
    for (name, repo) in store.iter() {
        let (clones, unique_clones) = totals(&repo.clones);
        let (views, unique_views) = totals(&repo.views);
        out.push_str(&format!(
            "{}\nclones: {}\nunique clones: {}\nviews: {}\nunique views: {}\n\n",
            name, clones, unique_clones, views, unique_views
        ));
    }
    out
}
