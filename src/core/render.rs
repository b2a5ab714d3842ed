use crate::domain::model::{CountryCount, DashboardData};
use crate::utils::error::Result;
use askama::Template;
use chrono::NaiveDate;

const DONUT_CIRCUMFERENCE: f64 = 515.2; // 2 * PI * r, r = 82
const DONUT_COLORS: [&str; 6] = ["#1A3C44", "#236E7D", "#528A97", "#6FA8B4", "#C47F3A", "#A3CDD6"];
const COLUMN_MAX_PX: f64 = 200.0;
const COLUMN_CHART_SIZE: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Footer date. The renderer never reads the clock.
    pub generated_on: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct DonutSlice {
    pub color: &'static str,
    pub dash: String,
    pub offset: String,
}

#[derive(Debug, Clone)]
pub struct LegendItem {
    pub color: &'static str,
    pub label: String,
    pub detail: String,
    pub pct: u32,
}

#[derive(Debug, Clone)]
pub struct ColumnBar {
    pub label: String,
    pub value: usize,
    pub height: String,
    pub color: &'static str,
}

#[derive(Debug, Clone)]
pub struct BarRow {
    pub label: String,
    pub value: usize,
    pub width: String,
}

#[derive(Debug, Clone)]
pub struct KpiCard {
    pub title: &'static str,
    pub color: &'static str,
    pub value: String,
    pub detail: String,
}

#[derive(Debug, Clone)]
pub struct DomesticRow {
    pub position: usize,
    pub name: String,
    pub entity: String,
}

#[derive(Debug, Clone)]
pub struct DirectoryRow {
    pub name: String,
    pub entity: String,
    pub home: String,
    pub authority: String,
    pub status: &'static str,
    pub status_class: &'static str,
    pub authorised_on: String,
    pub duplicate: bool,
    pub search: String,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub total: usize,
    pub total_rows: usize,
    pub num_countries: usize,
    pub top_code: String,
    pub top_name: String,
    pub top_count: usize,
    pub top_pct: u32,
    pub top3_pct: u32,
    pub focus_code: String,
    pub focus_name: String,
    pub focus_authority: String,
    pub focus_domestic_count: usize,
    pub focus_cross_border_count: usize,
    pub focus_active_count: usize,
    pub focus_origin_count: usize,
    pub donut: Vec<DonutSlice>,
    pub legend: Vec<LegendItem>,
    pub top_columns: Vec<ColumnBar>,
    pub country_bars: Vec<BarRow>,
    pub hubs: Vec<KpiCard>,
    pub origin_columns: Vec<ColumnBar>,
    pub domestic: Vec<DomesticRow>,
    pub service_bars: Vec<BarRow>,
    pub service_cards: Vec<KpiCard>,
    pub directory: Vec<DirectoryRow>,
    pub footer_stamp: String,
}

fn pct(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 / total as f64 * 100.0).round() as u32
}

fn ratio(part: usize, max: usize, scale: f64) -> String {
    let max = max.max(1);
    format!("{:.1}", part as f64 / max as f64 * scale)
}

fn donut(countries: &[CountryCount], total: usize) -> (Vec<DonutSlice>, Vec<LegendItem>) {
    let total_f = total.max(1) as f64;
    let top5 = &countries[..countries.len().min(5)];
    let top5_total: usize = top5.iter().map(|c| c.count).sum();
    let rest = total.saturating_sub(top5_total);

    let mut slices = Vec::with_capacity(top5.len() + 1);
    let mut offset = 0.0_f64;
    for (i, country) in top5.iter().enumerate() {
        let dash = (country.count as f64 / total_f * DONUT_CIRCUMFERENCE * 10.0).round() / 10.0;
        slices.push(DonutSlice {
            color: DONUT_COLORS[i],
            dash: format!("{:.1}", dash),
            offset: format!("{:.1}", -offset),
        });
        offset += dash;
    }
    let rest_dash = (rest as f64 / total_f * DONUT_CIRCUMFERENCE * 10.0).round() / 10.0;
    slices.push(DonutSlice {
        color: DONUT_COLORS[5],
        dash: format!("{:.1}", rest_dash),
        offset: format!("{:.1}", -offset),
    });

    // Fourth and fifth share one legend line when tied.
    let merge_tail = top5.len() == 5 && top5[3].count == top5[4].count;
    let mut legend = Vec::with_capacity(top5.len() + 1);
    for (i, country) in top5.iter().enumerate() {
        if merge_tail && i == 4 {
            continue;
        }
        let (label, detail) = if merge_tail && i == 3 {
            (
                format!("{} & {}", top5[3].name, top5[4].name),
                format!("{} providers each", country.count),
            )
        } else {
            (country.name.clone(), format!("{} providers", country.count))
        };
        legend.push(LegendItem {
            color: DONUT_COLORS[i],
            label,
            detail,
            pct: pct(country.count, total),
        });
    }
    legend.push(LegendItem {
        color: DONUT_COLORS[5],
        label: format!("Other ({} countries)", countries.len() - top5.len()),
        detail: format!("{} providers", rest),
        pct: pct(rest, total),
    });

    (slices, legend)
}

fn column_color(code: &str, top_code: &str, focus_code: &str) -> &'static str {
    if code == top_code {
        "#1A3C44"
    } else if code == focus_code {
        "#236E7D"
    } else {
        "#6FA8B4"
    }
}

fn hub_card(title: &'static str, color: &'static str, country: Option<&CountryCount>) -> KpiCard {
    KpiCard {
        title,
        color,
        value: country.map_or_else(|| "?".to_string(), |c| c.name.clone()),
        detail: format!("{} CASPs", country.map_or(0, |c| c.count)),
    }
}

impl DashboardTemplate {
    pub fn new(data: &DashboardData, options: &RenderOptions) -> Self {
        let total = data.total;
        let top = data.top_country();
        let top_code = top.map_or_else(|| "?".to_string(), |c| c.code.clone());
        let top_count = top.map_or(0, |c| c.count);
        let max_country = top_count.max(1);
        let top3: usize = data.countries.iter().take(3).map(|c| c.count).sum();

        let (donut, legend) = donut(&data.countries, total);

        let top_columns = data
            .countries
            .iter()
            .take(COLUMN_CHART_SIZE)
            .map(|c| ColumnBar {
                label: c.code.clone(),
                value: c.count,
                height: ratio(c.count, max_country, COLUMN_MAX_PX),
                color: column_color(&c.code, &top_code, &data.focus.code),
            })
            .collect();

        let country_bars = data
            .countries
            .iter()
            .map(|c| BarRow {
                label: c.name.clone(),
                value: c.count,
                width: ratio(c.count, max_country, 100.0),
            })
            .collect();

        let hubs = vec![
            hub_card("Largest hub", "#236E7D", data.countries.first()),
            hub_card("Second hub", "#528A97", data.countries.get(1)),
            hub_card("Third hub", "#C47F3A", data.countries.get(2)),
        ];

        let max_origin = data.focus.origins.first().map_or(1, |c| c.count);
        let origin_columns = data
            .focus
            .origins
            .iter()
            .map(|c| ColumnBar {
                label: c.name.clone(),
                value: c.count,
                height: ratio(c.count, max_origin, COLUMN_MAX_PX),
                color: "#528A97",
            })
            .collect();

        let domestic = data
            .focus
            .domestic
            .iter()
            .enumerate()
            .map(|(i, p)| DomesticRow {
                position: i + 1,
                name: p.name.clone(),
                entity: p.entity.clone(),
            })
            .collect();

        // Largest count sets the bar scale even though bars follow canonical order.
        let max_service = data.services.iter().map(|s| s.count).max().unwrap_or(1);
        let service_bars = data
            .services
            .iter()
            .map(|s| BarRow {
                label: s.label.clone(),
                value: s.count,
                width: ratio(s.count, max_service, 100.0),
            })
            .collect();

        let mut ranked = data.services.clone();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        let most = ranked.first();
        let second = ranked.get(1);
        let least = if ranked.len() > 1 { ranked.last() } else { None };
        let service_cards = vec![
            KpiCard {
                title: "Most offered",
                color: "#236E7D",
                value: most.map_or_else(|| "?".to_string(), |s| s.label.clone()),
                detail: format!(
                    "{} providers ({}%)",
                    most.map_or(0, |s| s.count),
                    pct(most.map_or(0, |s| s.count), total)
                ),
            },
            KpiCard {
                title: "Second most",
                color: "#528A97",
                value: second.map_or(0, |s| s.count).to_string(),
                detail: second.map_or_else(|| "?".to_string(), |s| s.label.clone()),
            },
            KpiCard {
                title: "Least offered",
                color: "#C47F3A",
                value: least.map_or_else(|| "?".to_string(), |s| s.label.clone()),
                detail: format!("only {} providers", least.map_or(0, |s| s.count)),
            },
        ];

        let directory = data
            .directory
            .iter()
            .map(|entry| DirectoryRow {
                search: format!(
                    "{} {} {} {} {}",
                    entry.name, entry.entity, entry.home, entry.home_name, entry.authority
                )
                .to_lowercase(),
                name: entry.name.clone(),
                entity: entry.entity.clone(),
                home: entry.home.clone(),
                authority: entry.authority.clone(),
                status: entry.status.label(),
                status_class: match entry.status {
                    crate::domain::model::AuthorisationStatus::Authorised => "status-active",
                    crate::domain::model::AuthorisationStatus::Withdrawn => "status-withdrawn",
                },
                authorised_on: entry.authorised_on.clone(),
                duplicate: entry.duplicate,
            })
            .collect();

        let footer_stamp = match options.generated_on {
            Some(date) => format!("Auto-generated {}", date.format("%d %B %Y")),
            None => format!("Generated from {} register rows", data.total_rows),
        };

        Self {
            total,
            total_rows: data.total_rows,
            num_countries: data.num_countries(),
            top_name: top.map_or_else(|| "?".to_string(), |c| c.name.clone()),
            top_code,
            top_count,
            top_pct: pct(top_count, total),
            top3_pct: pct(top3, total),
            focus_code: data.focus.code.clone(),
            focus_name: data.focus.name.clone(),
            focus_authority: data.focus.authority.clone(),
            focus_domestic_count: data.focus.domestic.len(),
            focus_cross_border_count: data.focus.cross_border_count,
            focus_active_count: data.focus.active_count(),
            focus_origin_count: data.focus.origins.len(),
            donut,
            legend,
            top_columns,
            country_bars,
            hubs,
            origin_columns,
            domestic,
            service_bars,
            service_cards,
            directory,
            footer_stamp,
        }
    }
}

/// Renders the complete dashboard page.
pub fn render_dashboard(data: &DashboardData, options: &RenderOptions) -> Result<String> {
    let html = DashboardTemplate::new(data, options).render()?;
    tracing::debug!("Rendered dashboard ({} bytes)", html.len());
    Ok(html)
}
