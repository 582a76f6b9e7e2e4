//! Server-rendered dashboard page.
//!
//! The page lists the routes, draws their paths on a plain SVG map and wires
//! the report, profile and upload forms to the JSON API. The login box is
//! presentational only.

use crate::model::{GeoPoint, Route, RouteRegistry, Saturation};
use crate::state::Statistics;

const MAP_WIDTH: f64 = 480.0;
const MAP_HEIGHT: f64 = 320.0;
const MAP_MARGIN: f64 = 16.0;

pub fn render(routes: &RouteRegistry, stats: &Statistics) -> String {
    let mut route_rows = String::new();
    let mut route_options = String::new();
    for r in routes.iter() {
        route_rows.push_str(&format!(
            r#"<div class="route"><div><span class="status {sat}"></span><strong>{code}</strong> - {name}</div><span>{min} min</span></div>"#,
            sat = r.saturation,
            code = escape(&r.code),
            name = escape(&r.name),
            min = r.estimated_minutes,
        ));
        route_options.push_str(&format!(
            r#"<option value="{code}">{code} - {name}</option>"#,
            code = escape(&r.code),
            name = escape(&r.name),
        ));
    }

    let busiest = stats.busiest_route.as_deref().map(escape).unwrap_or_default();

    PAGE.replace("{{ROUTE_ROWS}}", &route_rows)
        .replace("{{ROUTE_OPTIONS}}", &route_options)
        .replace("{{MAP}}", &render_map(routes))
        .replace("{{PROFILES}}", &stats.registered_profiles.to_string())
        .replace("{{BUSIEST}}", &busiest)
        .replace("{{HISTORY}}", &stats.historical_records.to_string())
}

/// SVG polylines of every route path, scaled to the bounding box of all points.
fn render_map(routes: &RouteRegistry) -> String {
    let points: Vec<GeoPoint> = routes.iter().flat_map(|r| r.path.iter().copied()).collect();
    if points.is_empty() {
        return r#"<div class="map-placeholder">No route geometry available</div>"#.to_string();
    }

    let (mut min_lat, mut max_lat) = (f64::MAX, f64::MIN);
    let (mut min_lon, mut max_lon) = (f64::MAX, f64::MIN);
    for p in &points {
        min_lat = min_lat.min(p.lat());
        max_lat = max_lat.max(p.lat());
        min_lon = min_lon.min(p.lon());
        max_lon = max_lon.max(p.lon());
    }
    let span_lat = (max_lat - min_lat).max(1e-9);
    let span_lon = (max_lon - min_lon).max(1e-9);

    let project = |p: &GeoPoint| {
        let x = MAP_MARGIN + (p.lon() - min_lon) / span_lon * (MAP_WIDTH - 2.0 * MAP_MARGIN);
        // north is up
        let y = MAP_MARGIN + (max_lat - p.lat()) / span_lat * (MAP_HEIGHT - 2.0 * MAP_MARGIN);
        (x, y)
    };

    let mut svg = format!(
        r#"<svg class="map" viewBox="0 0 {MAP_WIDTH} {MAP_HEIGHT}" xmlns="http://www.w3.org/2000/svg">"#
    );
    for r in routes.iter().filter(|r| !r.path.is_empty()) {
        let coords: Vec<String> = r
            .path
            .iter()
            .map(|p| {
                let (x, y) = project(p);
                format!("{x:.1},{y:.1}")
            })
            .collect();
        svg.push_str(&format!(
            r#"<polyline points="{}" stroke="{}" stroke-width="4" fill="none"><title>{}</title></polyline>"#,
            coords.join(" "),
            color(r.saturation),
            title(r),
        ));
    }
    svg.push_str("</svg>");
    svg
}

fn title(r: &Route) -> String {
    format!(
        "{} - {} ({}, {} min)",
        escape(&r.code),
        escape(&r.name),
        r.saturation,
        r.estimated_minutes
    )
}

fn color(s: Saturation) -> &'static str {
    match s {
        Saturation::Low => "#4CAF50",
        Saturation::Medium => "#FFC107",
        Saturation::High => "#f44336",
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

const PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Saturation Monitor</title>
<style>
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: Arial, sans-serif; background: linear-gradient(135deg, #667eea 0%, #764ba2 100%); min-height: 100vh; }
nav { display: flex; justify-content: space-between; align-items: center; padding: 12px 20px; background: rgba(0,0,0,0.2); color: white; }
nav form { display: flex; gap: 6px; }
nav input { width: 140px; }
.container { max-width: 1200px; margin: 0 auto; padding: 20px; }
.header { text-align: center; color: white; margin-bottom: 30px; }
.dashboard { display: grid; grid-template-columns: repeat(auto-fit, minmax(300px, 1fr)); gap: 20px; }
.card { background: rgba(255,255,255,0.95); border-radius: 15px; padding: 20px; }
.status { width: 15px; height: 15px; border-radius: 50%; display: inline-block; margin-right: 10px; }
.high { background: #f44336; } .medium { background: #FFC107; } .low { background: #4CAF50; }
.route { display: flex; justify-content: space-between; padding: 10px; margin: 8px 0; background: #f8f9fa; border-radius: 8px; }
.btn { background: #667eea; color: white; border: none; padding: 8px 16px; border-radius: 5px; cursor: pointer; margin: 5px; }
input, select { width: 100%; padding: 8px; border: 1px solid #ddd; border-radius: 5px; margin-top: 5px; }
.map { width: 100%; background: #eef1f5; border-radius: 10px; }
.map-placeholder { background: #e0e0e0; height: 200px; border-radius: 10px; display: flex; align-items: center; justify-content: center; color: #666; }
.msg { margin-top: 10px; font-size: 0.9em; }
</style>
</head>
<body>
<nav>
  <strong>Saturation Monitor</strong>
  <form onsubmit="event.preventDefault()">
    <input type="text" placeholder="User">
    <input type="password" placeholder="Password">
    <button class="btn" type="submit">Sign in</button>
  </form>
</nav>
<div class="container">
  <div class="header"><h1>Saturation Monitor</h1><p>Route crowding at a glance</p></div>
  <div class="dashboard">
    <div class="card"><h3>Route map</h3>{{MAP}}</div>
    <div class="card">
      <h3>Routes</h3>
      <div id="routes">{{ROUTE_ROWS}}</div>
      <button class="btn" onclick="refreshRoutes()">Refresh</button>
    </div>
    <div class="card">
      <h3>Report saturation</h3>
      <form onsubmit="sendReport(event)">
        <label>Route <select id="report-route">{{ROUTE_OPTIONS}}</select></label>
        <label>Level <select id="report-level">
          <option value="low">Low</option><option value="medium">Medium</option><option value="high">High</option>
        </select></label>
        <button class="btn" type="submit">Send report</button>
      </form>
      <div class="msg" id="report-msg"></div>
    </div>
    <div class="card">
      <h3>Profile</h3>
      <form onsubmit="saveProfile(event)">
        <label>Name <input type="text" id="profile-name" required></label>
        <label>Preferred route <select id="profile-route">{{ROUTE_OPTIONS}}</select></label>
        <button class="btn" type="submit">Save profile</button>
      </form>
      <div class="msg" id="profile-msg"></div>
    </div>
    <div class="card">
      <h3>Statistics</h3>
      <p><strong>Registered profiles:</strong> {{PROFILES}}</p>
      <p><strong>Busiest route:</strong> {{BUSIEST}}</p>
      <p><strong>Historical records:</strong> <span id="history-count">{{HISTORY}}</span></p>
    </div>
    <div class="card">
      <h3>Historical data</h3>
      <form onsubmit="uploadCsv(event)">
        <input type="file" id="csv-file" accept=".csv" required>
        <small>Columns: route,date,time,saturation,estimated_minutes</small>
        <button class="btn" type="submit">Upload CSV</button>
      </form>
      <button class="btn" onclick="callApi('/api/process-data')">Process data</button>
      <button class="btn" onclick="callApi('/api/export-data')">Export data</button>
      <div class="msg" id="data-msg"></div>
    </div>
  </div>
</div>
<script>
function show(id, data) { document.getElementById(id).textContent = (data.status === 'success' ? '' : 'Error: ') + data.message; }
function refreshRoutes() { fetch('/api/routes').then(() => location.reload()); }
function postJson(url, body) {
  return fetch(url, { method: 'POST', headers: {'Content-Type': 'application/json'}, body: JSON.stringify(body) }).then(r => r.json());
}
function sendReport(e) {
  e.preventDefault();
  postJson('/api/report', { route: document.getElementById('report-route').value, saturation: document.getElementById('report-level').value })
    .then(d => { show('report-msg', d); if (d.status === 'success') setTimeout(() => location.reload(), 500); });
}
function saveProfile(e) {
  e.preventDefault();
  postJson('/api/profile', { name: document.getElementById('profile-name').value, preferred_route: document.getElementById('profile-route').value })
    .then(d => show('profile-msg', d));
}
function uploadCsv(e) {
  e.preventDefault();
  const file = document.getElementById('csv-file').files[0];
  if (!file) return;
  const form = new FormData();
  form.append('csv_file', file);
  fetch('/api/upload-csv', { method: 'POST', body: form }).then(r => r.json()).then(d => {
    show('data-msg', d);
    if (d.status === 'success') document.getElementById('history-count').textContent = d.total_records;
  });
}
function callApi(url) { fetch(url).then(r => r.json()).then(d => show('data-msg', d)); }
setInterval(refreshRoutes, 30000);
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> Statistics {
        Statistics {
            total_routes: 5,
            registered_profiles: 2,
            reports_today: 12,
            busiest_route: Some("T1".into()),
            historical_records: 7,
        }
    }

    #[test]
    fn test_render_lists_every_route() {
        let reg = RouteRegistry::default();
        let html = render(&reg, &stats());
        for code in reg.codes() {
            assert!(html.contains(&format!("<strong>{code}</strong>")));
            assert!(html.contains(&format!(r#"<option value="{code}">"#)));
        }
        assert_eq!(html.matches("<polyline").count(), reg.len());
        assert!(html.contains("<polyline"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }
}
