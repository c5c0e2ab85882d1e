//! Render the default triangle headlessly and write it to `triangle.png`.
//!
//! Set `RUST_LOG=debug` to see each pipeline step.

use std::path::Path;

use basic_triangle::{render_triangle, Error, SoftContext, TriangleConfig};

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = TriangleConfig::default();
    let mut ctx = SoftContext::new(config.width, config.height);
    render_triangle(&mut ctx, &config)?;

    let path = Path::new("triangle.png");
    ctx.color_buffer().save_png(path)?;
    log::info!(
        "wrote {}x{} image to {}",
        config.width,
        config.height,
        path.display()
    );
    Ok(())
}
