//! GPU rendering system
//!
//! Manages GPU rendering including:
//! - Render context and surface
//! - The wgpu line pipeline and the fixel image drawn through it
//! - Frame rendering

use std::rc::Rc;
use std::sync::Arc;
use winit::window::Window;
use fixelview_core::{FixelSource, Vec3};
use fixelview_render::{
    context::RenderContext,
    pipeline::LinePipeline,
    FixelImage, OrbitCamera,
};
use fixelview::config::{CameraConfig, RenderingConfig};
use fixelview::viewer::ViewerState;

/// Render error types
#[derive(Debug)]
pub enum RenderError {
    /// Surface was lost (window resized, minimized, etc.)
    SurfaceLost,
    /// GPU out of memory
    OutOfMemory,
    /// Other surface or setup error
    Other(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::SurfaceLost => write!(f, "Surface lost"),
            RenderError::OutOfMemory => write!(f, "Out of memory"),
            RenderError::Other(msg) => write!(f, "Render error: {}", msg),
        }
    }
}

impl std::error::Error for RenderError {}

/// Centre of the volume and the radius of its bounding sphere, in scanner space
fn volume_bounds<S: FixelSource + ?Sized>(source: &S) -> (Vec3, f32) {
    let dims = source.dims();
    let last = dims.map(|d| d.saturating_sub(1));
    let lo = source.transform().voxel_to_scanner([0, 0, 0]);
    let hi = source.transform().voxel_to_scanner(last);
    let centre = (lo + hi) * 0.5;
    let radius = ((hi - lo).length() * 0.5).max(1.0);
    (centre, radius)
}

/// Manages GPU rendering
pub struct RenderSystem {
    context: RenderContext,
    pipeline: Rc<LinePipeline>,
    image: FixelImage<LinePipeline>,
    camera: OrbitCamera,
    render_config: RenderingConfig,
}

impl RenderSystem {
    /// Create render system from window and config, uploading `source`
    pub fn new<S: FixelSource + ?Sized>(
        window: Arc<Window>,
        source: &S,
        name: &str,
        render_config: RenderingConfig,
        camera_config: &CameraConfig,
        vsync: bool,
    ) -> Result<Self, RenderError> {
        let context = pollster::block_on(RenderContext::with_vsync(window, vsync))
            .map_err(|e| RenderError::Other(e.to_string()))?;

        let pipeline = Rc::new(LinePipeline::new(
            context.device.clone(),
            context.queue.clone(),
            context.config.format,
        ));
        pipeline.ensure_depth_texture(context.size.width, context.size.height);

        let image = FixelImage::new(pipeline.clone(), name, source);

        let (centre, radius) = volume_bounds(source);
        let mut camera = OrbitCamera::new(centre, camera_config.distance.unwrap_or(radius * 2.5));
        camera.fov_y = camera_config.fov.to_radians();
        camera.near = camera_config.near;
        camera.far = camera_config.far;

        Ok(Self {
            context,
            pipeline,
            image,
            camera,
            render_config,
        })
    }

    /// Handle window resize
    pub fn resize(&mut self, width: u32, height: u32) {
        self.context
            .resize(winit::dpi::PhysicalSize::new(width, height));
        self.pipeline.ensure_depth_texture(width, height);
    }

    /// Reconfigure the surface at its current size
    pub fn reconfigure(&mut self) {
        let size = self.context.size;
        self.resize(size.width, size.height);
    }

    pub fn image(&self) -> &FixelImage<LinePipeline> {
        &self.image
    }

    /// Image and camera, for applying viewer actions
    pub fn parts_mut(&mut self) -> (&mut FixelImage<LinePipeline>, &mut OrbitCamera) {
        (&mut self.image, &mut self.camera)
    }

    /// Render a single frame
    pub fn render_frame(&mut self, state: &ViewerState) -> Result<(), RenderError> {
        // Get surface texture
        let output = match self.context.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost) => return Err(RenderError::SurfaceLost),
            Err(wgpu::SurfaceError::OutOfMemory) => return Err(RenderError::OutOfMemory),
            Err(e) => return Err(RenderError::Other(format!("{:?}", e))),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let projection = self.camera.projection(self.context.aspect_ratio());
        self.image.render(&state.tool, &projection, state.axis, state.slice);

        // Create command encoder
        let mut encoder = self
            .context
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Fixel Encoder"),
            });

        let bg = &self.render_config.background_color;
        self.pipeline.encode(
            &mut encoder,
            &view,
            wgpu::Color {
                r: bg[0] as f64,
                g: bg[1] as f64,
                b: bg[2] as f64,
                a: bg[3] as f64,
            },
        );

        // Submit
        self.context.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fixelview_core::FixelVolume;

    #[test]
    fn test_render_error_display() {
        assert_eq!(format!("{}", RenderError::SurfaceLost), "Surface lost");
        assert_eq!(format!("{}", RenderError::OutOfMemory), "Out of memory");
        assert_eq!(
            format!("{}", RenderError::Other("test".to_string())),
            "Render error: test"
        );
    }

    #[test]
    fn test_volume_bounds_centred() {
        let volume = FixelVolume::new([11, 11, 11], [2.0, 2.0, 2.0]);
        let (centre, radius) = volume_bounds(&volume);
        assert!(centre.length() < 1e-4);
        assert!((radius - (20.0f32 * 3f32.sqrt()) * 0.5).abs() < 1e-3);
    }
}
