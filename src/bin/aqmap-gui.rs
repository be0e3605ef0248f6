/*!
 * GUI application for aqmap - interactive air-pollution choropleth.
 *
 * Loads the world outlines plus the PM2.5 and mortality tables on a
 * background thread, then binds them to an egui map with year scrubbing,
 * metric switching, hover tooltips, zoom/pan, and animated playback.
 *
 * Platform support: Windows, macOS, Linux
 */

use anyhow::Context;
use aqmap::dataset::{self, DatasetIndex};
use aqmap::geo::{self, point_in_ring, CountryShape};
use aqmap::view::Legend;
use aqmap::{Controller, Event, Metric};
use clap::Parser;
use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// Command-line configuration for the viewer.
#[derive(Debug, Parser)]
#[command(name = "aqmap-gui", about = "Air pollution and health choropleth viewer")]
struct Args {
    /// Directory holding world.geojson and the two CSV tables.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Playback interval in milliseconds (one year per tick).
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,
}

fn main() -> Result<(), eframe::Error> {
    env_logger::init();
    let args = Args::parse();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 700.0])
            .with_min_inner_size([700.0, 450.0])
            .with_title("Air Pollution & Health - aqmap"),
        ..Default::default()
    };

    eframe::run_native(
        "aqmap",
        options,
        Box::new(move |_cc| Ok(Box::new(AqmapApp::new(args)))),
    )
}

/// Everything the interactive session needs, available only once all
/// three sources have resolved.
struct LoadedData {
    index: DatasetIndex,
    shapes: Vec<CountryShape>,
    names: Vec<String>,
}

fn load_all(data_dir: PathBuf) -> anyhow::Result<LoadedData> {
    // The three sources load in parallel; interactivity waits on the join.
    let geo_dir = data_dir.clone();
    let pm_dir = data_dir.clone();
    let geo_handle = thread::spawn(move || geo::load_world_geojson_path(geo_dir.join("world.geojson")));
    let pm_handle =
        thread::spawn(move || dataset::load_pm25_csv_path(pm_dir.join("pm25_final_aggregated.csv")));
    let mort_rows =
        dataset::load_mortality_csv_path(data_dir.join("cause_specific_death_rate_by_country.csv"))
            .context("loading the mortality table")?;
    let shapes = geo_handle
        .join()
        .expect("geojson loader thread")
        .context("loading the world outlines")?;
    let pm25_rows = pm_handle
        .join()
        .expect("pm25 loader thread")
        .context("loading the PM2.5 table")?;

    let names = shapes.iter().map(|s| s.name.clone()).collect();
    Ok(LoadedData {
        index: DatasetIndex::build(&pm25_rows, &mort_rows),
        shapes,
        names,
    })
}

/// Main application state.
struct AqmapApp {
    interval: Duration,

    // Background load
    load_receiver: Option<mpsc::Receiver<anyhow::Result<LoadedData>>>,
    error_message: String,

    // Present only after a successful load; nothing interactive before.
    session: Option<MapSession>,
}

struct MapSession {
    index: DatasetIndex,
    shapes: Vec<CountryShape>,
    names: Vec<String>,
    controller: Controller,
}

impl AqmapApp {
    fn new(args: Args) -> Self {
        let (sender, receiver) = mpsc::channel();
        let data_dir = args.data_dir.clone();
        thread::spawn(move || {
            let _ = sender.send(load_all(data_dir));
        });

        Self {
            interval: Duration::from_millis(args.interval_ms.max(1)),
            load_receiver: Some(receiver),
            error_message: String::new(),
            session: None,
        }
    }

    fn check_load_result(&mut self) {
        if let Some(receiver) = &self.load_receiver
            && let Ok(result) = receiver.try_recv()
        {
            self.load_receiver = None;
            match result {
                Ok(data) => {
                    let controller = Controller::with_interval(&data.index, self.interval);
                    self.session = Some(MapSession {
                        index: data.index,
                        shapes: data.shapes,
                        names: data.names,
                        controller,
                    });
                }
                Err(err) => {
                    // {:#} prints the whole context chain on one line.
                    self.error_message = format!("Failed to load data: {err:#}");
                    log::error!("{}", self.error_message);
                }
            }
        }
    }
}

impl eframe::App for AqmapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_result();

        if self.load_receiver.is_some() {
            ctx.request_repaint();
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.vertical_centered(|ui| {
                    ui.add_space(60.0);
                    ui.spinner();
                    ui.label("Loading map and datasets...");
                });
            });
            return;
        }

        let Some(session) = &mut self.session else {
            // Load failed: surface the error instead of a silent hang.
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.add_space(40.0);
                ui.colored_label(egui::Color32::RED, &self.error_message);
            });
            return;
        };

        session.ui(ctx);
    }
}

impl MapSession {
    fn ui(&mut self, ctx: &egui::Context) {
        let now = Instant::now();
        if self.controller.poll(now) {
            ctx.request_repaint();
        }
        if self.controller.state().playing {
            ctx.request_repaint_after(self.controller.tick_interval());
        }

        self.controls(ctx, now);
        self.map_panel(ctx, now);
    }

    fn controls(&mut self, ctx: &egui::Context, now: Instant) {
        let (min_year, max_year) = (
            self.index.min_year().unwrap_or(0),
            self.index.max_year().unwrap_or(0),
        );

        egui::TopBottomPanel::top("controls").show(ctx, |ui| {
            let frame = self.controller.frame(&self.index, &[]);
            ui.add_space(4.0);
            ui.heading(&frame.title);

            ui.horizontal(|ui| {
                let playing = self.controller.state().playing;
                let play_label = if playing { "⏸ Pause" } else { "▶ Play" };
                if ui.button(play_label).clicked() {
                    self.controller.apply(Event::TogglePlay, now);
                }

                ui.label("Year:");
                let mut year = self.controller.state().year;
                let slider = ui.add(egui::Slider::new(&mut year, min_year..=max_year).step_by(1.0));
                if slider.changed() {
                    self.controller.apply(Event::SetYear(year), now);
                }
                ui.monospace(&frame.year_label);

                ui.separator();
                ui.label("Metric:");
                let current = self.controller.state().metric;
                egui::ComboBox::from_id_salt("metric")
                    .selected_text(current.label())
                    .show_ui(ui, |ui| {
                        for m in Metric::ALL {
                            if ui.selectable_label(current == m, m.label()).clicked() {
                                self.controller.apply(Event::SetMetric(m), now);
                            }
                        }
                    });
            });
            ui.add_space(4.0);
        });
    }

    fn map_panel(&mut self, ctx: &egui::Context, now: Instant) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let (rect, response) = ui.allocate_exact_size(
                ui.available_size(),
                egui::Sense::click_and_drag(),
            );
            let painter = ui.painter_at(rect);
            painter.rect_filled(rect, 0.0, egui::Color32::from_rgb(0xf8, 0xf9, 0xfa));

            // Pan with drag, zoom on scroll around the pointer.
            let drag = response.drag_delta();
            if drag != egui::Vec2::ZERO {
                self.controller.apply(
                    Event::Pan {
                        dx: drag.x,
                        dy: drag.y,
                    },
                    now,
                );
            }
            if response.hovered() {
                let zoom = ui.input(|i| i.zoom_delta()) * scroll_zoom(ui);
                if (zoom - 1.0).abs() > f32::EPSILON
                    && let Some(pos) = response.hover_pos()
                {
                    self.controller.apply(
                        Event::Zoom {
                            factor: zoom,
                            focus: (pos.x - rect.left(), pos.y - rect.top()),
                        },
                        now,
                    );
                }
            }

            // Project every ring to screen space once per repaint.
            let transform = self.controller.transform();
            let screen_rings: Vec<Vec<Vec<egui::Pos2>>> = self
                .shapes
                .iter()
                .map(|shape| {
                    shape
                        .rings
                        .iter()
                        .map(|ring| {
                            ring.iter()
                                .map(|&(lon, lat)| {
                                    let (x, y) = project(lon, lat, rect);
                                    let (x, y) = transform.apply((x, y));
                                    egui::pos2(rect.left() + x, rect.top() + y)
                                })
                                .collect()
                        })
                        .collect()
                })
                .collect();

            // Hover hit test in screen space; drags do not change hover.
            if let Some(pos) = response.hover_pos() {
                let hit = self
                    .shapes
                    .iter()
                    .zip(&screen_rings)
                    .find(|(_, rings)| {
                        rings.iter().any(|r| {
                            let ring: Vec<(f64, f64)> =
                                r.iter().map(|p| (p.x as f64, p.y as f64)).collect();
                            point_in_ring(pos.x as f64, pos.y as f64, &ring)
                        })
                    })
                    .map(|(shape, _)| shape.name.clone());
                match hit {
                    Some(name) => self.controller.apply(Event::Hover(name), now),
                    None => self.controller.apply(Event::Unhover, now),
                }
            } else if self.controller.hovered().is_some() {
                self.controller.apply(Event::Unhover, now);
            }

            // One frame drives fills, legend, and tooltip alike.
            let frame = self.controller.frame(&self.index, &self.names);

            let stroke = egui::Stroke::new(0.6, egui::Color32::WHITE);
            for ((_, fill), rings) in frame.fills.iter().zip(&screen_rings) {
                let color = to_color32(fill.rgb());
                for ring in rings {
                    if ring.len() >= 3 {
                        fill_ring(&painter, ring, color, stroke);
                    }
                }
            }

            self.draw_legend(&painter, rect, &frame.legend);

            if let Some(tooltip) = &frame.tooltip {
                egui::show_tooltip_at_pointer(
                    ctx,
                    ui.layer_id(),
                    egui::Id::new("country_tooltip"),
                    |ui| {
                        let mut lines = tooltip.lines().into_iter();
                        if let Some(head) = lines.next() {
                            ui.strong(head);
                        }
                        for line in lines {
                            ui.label(line);
                        }
                    },
                );
            }
        });
    }

    /// Vertical gradient bar with tick labels and a metric title, pinned to
    /// the top-right corner of the map panel.
    fn draw_legend(&self, painter: &egui::Painter, rect: egui::Rect, legend: &Legend) {
        const BAR_W: f32 = 16.0;
        const BAR_H: f32 = 200.0;
        const STEPS: usize = 64;

        let x = rect.right() - 50.0;
        let y = rect.top() + 50.0;

        let step_h = BAR_H / STEPS as f32;
        for i in 0..STEPS {
            // Top of the bar is the domain max.
            let t = 1.0 - (i as f64 + 0.5) / STEPS as f64;
            let color = to_color32(legend.scale.sample(t));
            let seg = egui::Rect::from_min_size(
                egui::pos2(x, y + i as f32 * step_h),
                egui::vec2(BAR_W, step_h + 0.5),
            );
            painter.rect_filled(seg, 0.0, color);
        }
        painter.rect_stroke(
            egui::Rect::from_min_size(egui::pos2(x, y), egui::vec2(BAR_W, BAR_H)),
            2.0,
            egui::Stroke::new(1.0, egui::Color32::from_gray(0xcc)),
        );

        let span = legend.scale.hi - legend.scale.lo;
        for &tick in &legend.ticks {
            let t = if span > 0.0 {
                ((tick - legend.scale.lo) / span) as f32
            } else {
                0.0
            };
            let ty = y + BAR_H * (1.0 - t);
            painter.text(
                egui::pos2(x - 8.0, ty),
                egui::Align2::RIGHT_CENTER,
                Legend::tick_label(tick),
                egui::FontId::proportional(12.0),
                egui::Color32::DARK_GRAY,
            );
        }

        painter.text(
            egui::pos2(x + BAR_W / 2.0, y - 12.0),
            egui::Align2::CENTER_BOTTOM,
            &legend.title,
            egui::FontId::proportional(14.0),
            egui::Color32::BLACK,
        );
    }
}

/// Equirectangular projection of lon/lat into panel-local pixels,
/// letterboxed to keep the 2:1 world aspect.
fn project(lon: f64, lat: f64, rect: egui::Rect) -> (f32, f32) {
    let scale = (rect.width() / 360.0).min(rect.height() / 180.0);
    let w = 360.0 * scale;
    let h = 180.0 * scale;
    let ox = (rect.width() - w) / 2.0;
    let oy = (rect.height() - h) / 2.0;
    (
        ox + ((lon + 180.0) / 360.0) as f32 * w,
        oy + ((90.0 - lat) / 180.0) as f32 * h,
    )
}

/// Translate raw scroll into a zoom factor (pinch zoom comes through
/// `zoom_delta` already).
fn scroll_zoom(ui: &egui::Ui) -> f32 {
    let scroll = ui.input(|i| i.raw_scroll_delta.y);
    (scroll * 0.002).exp()
}

fn to_color32(c: aqmap::Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(c.r, c.g, c.b)
}

/// Fill one country ring. Country outlines are concave, so the fill goes
/// through an ear-clipped triangle mesh; rings the clipper cannot handle
/// (self-intersecting or degenerate) fall back to the convex fill.
fn fill_ring(painter: &egui::Painter, ring: &[egui::Pos2], color: egui::Color32, stroke: egui::Stroke) {
    match triangulate(ring) {
        Some(tris) => {
            let mut mesh = egui::Mesh::default();
            for p in ring {
                mesh.colored_vertex(*p, color);
            }
            for [a, b, c] in tris {
                mesh.add_triangle(a as u32, b as u32, c as u32);
            }
            painter.add(egui::Shape::mesh(mesh));
            painter.add(egui::Shape::closed_line(ring.to_vec(), stroke));
        }
        None => {
            painter.add(egui::Shape::convex_polygon(ring.to_vec(), color, stroke));
        }
    }
}

/// Ear-clipping triangulation of a simple polygon. Returns index triples
/// into `ring`, or `None` when no ear can be clipped.
fn triangulate(ring: &[egui::Pos2]) -> Option<Vec<[usize; 3]>> {
    let mut pts: Vec<usize> = (0..ring.len()).collect();
    if ring.len() >= 2 && ring.first() == ring.last() {
        pts.pop();
    }
    if pts.len() < 3 {
        return None;
    }

    let cross = |a: egui::Pos2, b: egui::Pos2, c: egui::Pos2| {
        (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
    };

    // Normalize to counter-clockwise so convex vertices have positive cross.
    let signed_area: f32 = pts
        .iter()
        .enumerate()
        .map(|(i, &p)| {
            let q = pts[(i + 1) % pts.len()];
            ring[p].x * ring[q].y - ring[q].x * ring[p].y
        })
        .sum();
    if signed_area < 0.0 {
        pts.reverse();
    }

    let mut tris = Vec::with_capacity(pts.len() - 2);
    while pts.len() > 3 {
        let m = pts.len();
        let mut clipped = false;
        for i in 0..m {
            let (pi, pj, pk) = (pts[(i + m - 1) % m], pts[i], pts[(i + 1) % m]);
            let (a, b, c) = (ring[pi], ring[pj], ring[pk]);
            if cross(a, b, c) <= 0.0 {
                continue; // reflex corner, not an ear
            }
            let ear_is_clear = pts.iter().all(|&p| {
                p == pi
                    || p == pj
                    || p == pk
                    || !(cross(a, b, ring[p]) >= 0.0
                        && cross(b, c, ring[p]) >= 0.0
                        && cross(c, a, ring[p]) >= 0.0)
            });
            if ear_is_clear {
                tris.push([pi, pj, pk]);
                pts.remove(i);
                clipped = true;
                break;
            }
        }
        if !clipped {
            return None;
        }
    }
    let (a, b, c) = (pts[0], pts[1], pts[2]);
    if cross(ring[a], ring[b], ring[c]).abs() > f32::EPSILON {
        tris.push([a, b, c]);
    }
    if tris.is_empty() {
        return None;
    }
    Some(tris)
}
