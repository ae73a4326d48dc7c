use sigdash_core::aggregate::TypeDistribution;
use sigdash_core::domain::analysis::PerformanceMetrics;
use sigdash_core::format;
use sigdash_core::paging::PageItem;
use sigdash_core::subscription::{Notice, Tone};
use sigdash_core::view::{DashboardView, ReportList};
use sigdash_core::viewport::LayoutMode;
use std::fmt::Write;

const BAR_WIDTH: usize = 30;

pub fn dashboard(view: &DashboardView, layout: LayoutMode) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Signals as of {} ({} total)",
        format::date(&view.date),
        view.total_signals
    );
    out.push('\n');
    out.push_str(&performance(&view.performance, layout));

    out.push_str("\nTop picks\n");
    for pick in &view.top_picks {
        let s = &pick.signal;
        let line = match layout {
            LayoutMode::Compact => format!(
                "#{} {} {} {}",
                pick.rank,
                s.symbol,
                s.signal_type,
                format::signed_percent(s.expected_return, 1)
            ),
            LayoutMode::Regular => format!(
                "#{:<2} {:<8} {:<24} {:<4}  YoY {:>7}  MoM {:>7}  Exp {:>7}  Conf {:>6}",
                pick.rank,
                s.symbol,
                truncate(&s.company_name, 24),
                s.signal_type,
                format::signed_percent(s.yoy_growth, 1),
                format::signed_percent(s.mom_growth, 1),
                format::signed_percent(s.expected_return, 1),
                format::confidence(&s.confidence),
            ),
        };
        let _ = writeln!(out, "  {line}");
    }

    out.push_str("\nSignal mix\n");
    out.push_str(&distribution(&view.distribution, layout));

    out.push_str("\nSectors\n");
    for sector in &view.sectors {
        let label = format::sector_label(&sector.sector, &sector.sector_name);
        let _ = match layout {
            LayoutMode::Compact => writeln!(out, "  {label} ({})", sector.signal_count),
            LayoutMode::Regular => writeln!(
                out,
                "  {:<26} {:>3} signals  YoY {:>7}  MoM {:>7}",
                label,
                sector.signal_count,
                format::signed_percent(sector.avg_yoy_growth, 1),
                format::signed_percent(sector.avg_mom_growth, 1),
            ),
        };
    }
    out
}

fn performance(p: &PerformanceMetrics, layout: LayoutMode) -> String {
    let fields = [
        ("Avg return", format::signed_percent(p.avg_return, 2)),
        ("Win rate", format::win_rate(p.win_rate)),
        ("Sharpe", format::sharpe(p.sharpe_ratio)),
        ("Max drawdown", format::percent(p.max_drawdown, 2)),
    ];
    match layout {
        LayoutMode::Compact => fields
            .iter()
            .map(|(k, v)| format!("{k}: {v}\n"))
            .collect(),
        LayoutMode::Regular => {
            let joined: Vec<String> = fields.iter().map(|(k, v)| format!("{k} {v}")).collect();
            format!("{}\n", joined.join("  |  "))
        }
    }
}

fn distribution(d: &TypeDistribution, layout: LayoutMode) -> String {
    if d.is_empty() {
        return "  (no signals)\n".to_string();
    }
    let mut out = String::new();
    for bucket in &d.buckets {
        let pct = format::percent(bucket.percent, 1);
        let _ = match layout {
            LayoutMode::Compact => writeln!(out, "  {} {} ({pct})", bucket.signal_type, bucket.count),
            LayoutMode::Regular => {
                let filled = (bucket.percent / 100.0 * BAR_WIDTH as f64).round() as usize;
                writeln!(
                    out,
                    "  {:<4} {:<width$} {:>3} ({pct})",
                    bucket.signal_type,
                    "#".repeat(filled.min(BAR_WIDTH)),
                    bucket.count,
                    width = BAR_WIDTH,
                )
            }
        };
    }
    out
}

pub fn reports(list: &ReportList, layout: LayoutMode) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Reports (page {} of {}, {} total)",
        list.page,
        list.total_pages.max(1),
        list.total
    );
    for report in &list.reports {
        let perf = &report.analysis_result.performance;
        let _ = match layout {
            LayoutMode::Compact => writeln!(out, "  {}  {}", report.id, format::date(&report.date)),
            LayoutMode::Regular => {
                let picks: Vec<&str> = report
                    .analysis_result
                    .top_picks
                    .iter()
                    .map(|s| s.symbol.as_str())
                    .collect();
                writeln!(
                    out,
                    "  {:<16} {}  avg {:>7}  win {:>6}  picks: {}",
                    report.id,
                    format::date(&report.date),
                    format::signed_percent(perf.avg_return, 2),
                    format::win_rate(perf.win_rate),
                    picks.join(", "),
                )
            }
        };
    }
    if !list.window.is_empty() {
        let _ = writeln!(out, "  {}", pager(&list.window, list.page, list.total_pages));
    }
    out
}

fn pager(window: &[PageItem], current: u32, total: u32) -> String {
    let mut parts = Vec::with_capacity(window.len() + 2);
    parts.push(if current > 1 { "<".to_string() } else { " ".to_string() });
    for item in window {
        parts.push(match item {
            PageItem::Page(p) if *p == current => format!("[{p}]"),
            other => other.to_string(),
        });
    }
    parts.push(if current < total { ">".to_string() } else { " ".to_string() });
    parts.join(" ")
}

pub fn notice(n: &Notice) -> String {
    let tag = match n.tone {
        Tone::Success => "ok",
        Tone::Info => "note",
        Tone::Error => "error",
    };
    format!("{tag}: {}", n.message)
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
