#![allow(clippy::expect_used, clippy::unwrap_used)]
//! Swarm Plot Example
//!
//! Lays out response times per endpoint and prints the result as ASCII art
//! through a layer visitor.
//!
//! Run with: `cargo run --example swarm_basic`

use trueno_swarm::prelude::*;

#[derive(Debug, Clone)]
struct Request {
    endpoint: &'static str,
    millis: f32,
    bytes: f32,
}

fn requests() -> Vec<Request> {
    let endpoints = ["/login", "/search", "/upload"];
    let mut seed: u32 = 7;
    (0..90)
        .map(|i| {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12345);
            let noise = (seed >> 16) as f32 / 65536.0;
            let endpoint = endpoints[i % 3];
            let base = match endpoint {
                "/login" => 40.0,
                "/search" => 120.0,
                _ => 260.0,
            };
            Request { endpoint, millis: base + noise * 80.0, bytes: 200.0 + noise * 4000.0 }
        })
        .collect()
}

/// Renders circle centers into a character grid.
struct AsciiCanvas {
    cols: usize,
    rows: usize,
    cells: Vec<char>,
}

impl AsciiCanvas {
    fn new(cols: usize, rows: usize) -> Self {
        Self { cols, rows, cells: vec![' '; cols * rows] }
    }

    fn plot(&mut self, x: f32, y: f32, width: f32, height: f32, glyph: char) {
        let col = ((x / width) * (self.cols - 1) as f32).round() as usize;
        let row = ((y / height) * (self.rows - 1) as f32).round() as usize;
        if col < self.cols && row < self.rows {
            self.cells[row * self.cols + col] = glyph;
        }
    }

    fn print(&self) {
        for row in self.cells.chunks(self.cols) {
            println!("  |{}", row.iter().collect::<String>());
        }
        println!("  +{}", "-".repeat(self.cols));
    }
}

impl LayerVisitor<&'static str> for AsciiCanvas {
    fn circles(&mut self, ctx: &LayerContext<'_, &'static str>) {
        for node in ctx.nodes {
            let glyph = if node.radius() > 6.0 { 'O' } else { 'o' };
            self.plot(node.x(), node.y(), ctx.inner_width, ctx.inner_height, glyph);
        }
    }
}

fn main() {
    println!("Swarm Plot Example");
    println!("==================\n");

    let data = requests();

    // Example 1: Horizontal swarm, size by payload
    println!("Example 1: Response time by endpoint");
    println!("------------------------------------");

    let accessors = Accessors::new(|r: &Request| r.millis, |r: &Request| r.endpoint).size(
        SizeSpec::Scaled {
            accessor: Box::new(|r: &Request| r.bytes),
            values: (200.0, 4200.0),
            sizes: (4.0, 16.0),
        },
    );

    let plot = SwarmPlot::new(accessors)
        .groups(["/login", "/search", "/upload"])
        .orientation(Orientation::Horizontal)
        .gap(12.0)
        .spacing(1.0)
        .dimensions(720, 240)
        .build(&data)
        .expect("Failed to build swarm plot");

    println!("  Nodes: {}", plot.nodes().len());
    if let Some(bounds) = plot.bounds() {
        println!("  Secondary extent: {:.1}..{:.1}", bounds.min, bounds.max);
    }
    println!("  Residual overlap: {:.3}px\n", plot.layout().residual_overlap());

    let mut canvas = AsciiCanvas::new(72, 18);
    plot.visit_layers(&Layer::defaults(), &mut canvas);
    canvas.print();

    // Example 2: Config from YAML, one unified swarm
    println!("\nExample 2: Unified swarm from YAML config");
    println!("-----------------------------------------");

    let config = LayoutConfig::parse(
        r"
spacing: 0.5
iterations: 60
orientation: vertical
group_mode: unified
",
    )
    .expect("Failed to parse config");

    let unified = SwarmPlot::new(Accessors::new(|r: &Request| r.millis, |_: &Request| "all"))
        .groups(["all"])
        .layout_config(config)
        .value_scale(ValueScaleSpec::log())
        .dimensions(240, 360)
        .build(&data)
        .expect("Failed to build swarm plot");

    let widest = unified
        .nodes()
        .iter()
        .map(|n| (n.x() - 120.0).abs())
        .fold(0.0_f32, f32::max);
    println!("  Nodes: {}", unified.nodes().len());
    println!("  Widest offset from center: {widest:.1}px");
    println!("  Residual overlap: {:.3}px", unified.layout().residual_overlap());
}
