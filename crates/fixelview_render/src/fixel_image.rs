//! Renderable fixel field
//!
//! A [`FixelImage`] tessellates its source once on construction, uploads the
//! vertex buffer, and from then on only draws: either every segment (through
//! the axis-0 partition joined across slices) or the segments of one
//! (axis, slice) bucket.

use std::rc::Rc;

use fixelview_core::{ColourType, Displayable, FixelGeometry, FixelSource};
use fixelview_core::colourmap;

use crate::camera::Projection;
use crate::gpu::GpuContext;
use crate::pipeline::{FixelShader, FixelUniforms, RenderState, RenderStateGuard, ShaderKey};
use crate::resources::GpuResources;

/// Per-tool display settings owned by the fixel tool
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FixelToolSettings {
    /// Draw only the current slice
    pub crop_to_slice: bool,
    /// Below 1.0, lines blend additively without depth testing
    pub line_opacity: f32,
    /// Requested line width in pixels
    pub line_thickness: f32,
}

impl Default for FixelToolSettings {
    fn default() -> Self {
        Self {
            crop_to_slice: true,
            line_opacity: 1.0,
            line_thickness: 1.0,
        }
    }
}

/// A loaded fixel field ready to draw
pub struct FixelImage<G: GpuContext> {
    /// Windowing, thresholds and colour map
    pub displayable: Displayable,
    geometry: FixelGeometry,
    resources: GpuResources<G>,
    shader: FixelShader,
    line_length: f32,
    pub line_length_multiplier: f32,
    pub scale_line_length_by_value: bool,
    pub colour_type: ColourType,
    /// Colour for [`ColourType::Colour`]
    pub colour: [f32; 3],
}

impl<G: GpuContext> FixelImage<G> {
    /// Tessellate `source` and upload it
    pub fn new<S: FixelSource + ?Sized>(gpu: Rc<G>, name: impl Into<String>, source: &S) -> Self {
        let name = name.into();
        let geometry = FixelGeometry::tessellate(source);
        let resources = GpuResources::upload(gpu, &name, &geometry.vertices);

        let mut displayable = Displayable::new(name);
        // the table always holds the default map
        let _ = displayable.set_colourmap(colourmap::DEFAULT_MAP);
        displayable.value_min = geometry.value_min;
        displayable.value_max = geometry.value_max;
        displayable.lessthan = geometry.value_min;
        displayable.greaterthan = geometry.value_max;
        if let Some((min, max)) = geometry.value_range() {
            displayable.set_windowing(min, max);
        }

        log::info!(
            "Loaded fixel image '{}': {} fixels, {} vertices, values {:?}",
            displayable.name,
            geometry.element_count(),
            geometry.vertices.len(),
            geometry.value_range()
        );

        Self {
            displayable,
            line_length: geometry.default_line_length(),
            geometry,
            resources,
            shader: FixelShader::new(),
            line_length_multiplier: 1.0,
            scale_line_length_by_value: false,
            colour_type: ColourType::Value,
            colour: [1.0, 1.0, 1.0],
        }
    }

    pub fn geometry(&self) -> &FixelGeometry {
        &self.geometry
    }

    pub fn resources(&self) -> &GpuResources<G> {
        &self.resources
    }

    /// Number of slices along `axis`
    pub fn slice_count(&self, axis: usize) -> usize {
        self.geometry.partitions.get(axis).map_or(0, |p| p.len())
    }

    /// Base segment length before the multiplier
    pub fn line_length(&self) -> f32 {
        self.line_length
    }

    pub fn set_line_length(&mut self, length: f32) {
        self.line_length = length;
    }

    /// Everything the generated program depends on
    pub fn shader_key(&self) -> ShaderKey {
        ShaderKey {
            colour_type: self.colour_type,
            colourmap: self.displayable.colourmap(),
            flags: self.displayable.flags(),
        }
    }

    /// Whether the cached program is stale
    pub fn need_update(&self) -> bool {
        self.shader.need_update(&self.shader_key())
    }

    /// Rebuild the cached program for the current configuration
    pub fn update_shader(&mut self) {
        let key = self.shader_key();
        self.shader.update(key);
    }

    /// Uniform block for this frame
    pub fn uniforms(&self, projection: &Projection) -> FixelUniforms {
        FixelUniforms {
            mvp: projection.mvp,
            const_colour: self.colour,
            line_length: self.line_length * self.line_length_multiplier,
            max_value: self.displayable.value_max,
            offset: self.displayable.offset(),
            scale: self.displayable.scale(),
            lower: self.displayable.lessthan,
            upper: self.displayable.greaterthan,
            scale_line_length_by_value: self.scale_line_length_by_value as u32,
            _padding: [0; 2],
        }
    }

    /// Draw the field
    ///
    /// With `crop_to_slice` off every segment is drawn and `axis`/`slice` are
    /// ignored; otherwise only the bucket for (`axis`, `slice`).
    pub fn render(&mut self, tool: &FixelToolSettings, projection: &Projection, axis: usize, slice: usize) {
        if self.need_update() {
            self.update_shader();
        }

        let bucket = if tool.crop_to_slice {
            match self.geometry.slice(axis, slice) {
                Some(bucket) => bucket,
                None => {
                    log::warn!(
                        "Slice {} on axis {} is outside '{}'; nothing drawn",
                        slice,
                        axis,
                        self.displayable.name
                    );
                    return;
                }
            }
        } else {
            self.geometry.whole_volume()
        };

        let (Some(program), Some(layout)) = (self.shader.program(), self.resources.vertex_layout()) else {
            return;
        };

        let gpu = self.resources.gpu();
        gpu.use_program(program);
        gpu.set_uniforms(&self.uniforms(projection));

        let _state = RenderStateGuard::apply(
            gpu,
            RenderState::for_lines(tool.line_opacity, tool.line_thickness),
        );
        gpu.bind_vertex_layout(layout);
        if !bucket.is_empty() {
            gpu.multi_draw_lines(&bucket.firsts, &bucket.counts);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{GpuCall, RecordingGpu};
    use fixelview_core::{FixelElement, FixelVolume, Vec3};

    fn scenario_volume() -> FixelVolume {
        let mut v = FixelVolume::new([2, 2, 2], [1.0, 1.0, 1.0]);
        v.push_element([1, 0, 1], FixelElement::new(Vec3::X, 0.5)).unwrap();
        v.push_element([0, 1, 0], FixelElement::new(Vec3::Y, 0.25)).unwrap();
        v.push_element([0, 1, 0], FixelElement::new(Vec3::Z, 1.5)).unwrap();
        v
    }

    fn image(gpu: &Rc<RecordingGpu>) -> FixelImage<RecordingGpu> {
        FixelImage::new(gpu.clone(), "scenario", &scenario_volume())
    }

    #[test]
    fn test_construction_seeds_windowing_and_thresholds() {
        let gpu = Rc::new(RecordingGpu::new());
        let img = image(&gpu);
        assert_eq!(img.displayable.value_min, 0.25);
        assert_eq!(img.displayable.value_max, 1.5);
        assert_eq!(img.displayable.lessthan, 0.25);
        assert_eq!(img.displayable.greaterthan, 1.5);
        assert_eq!(img.displayable.offset(), 0.25);
        assert_eq!(img.displayable.colourmap(), colourmap::DEFAULT_MAP);
        assert!((img.line_length() - 0.45).abs() < 1e-6);
    }

    #[test]
    fn test_construction_uploads_buffer() {
        let gpu = Rc::new(RecordingGpu::new());
        let _img = image(&gpu);
        assert!(matches!(gpu.calls()[0], GpuCall::CreateBuffer { vertex_count: 8, .. }));
        assert!(matches!(gpu.calls()[1], GpuCall::CreateVertexLayout { .. }));
    }

    #[test]
    fn test_whole_volume_single_draw() {
        let gpu = Rc::new(RecordingGpu::new());
        let mut img = image(&gpu);
        let tool = FixelToolSettings { crop_to_slice: false, ..Default::default() };
        img.render(&tool, &Projection::default(), 2, 1);
        assert_eq!(gpu.draws(), vec![(vec![0, 2, 4], vec![2, 2, 2])]);
    }

    #[test]
    fn test_crop_draws_one_bucket() {
        let gpu = Rc::new(RecordingGpu::new());
        let mut img = image(&gpu);
        let tool = FixelToolSettings::default();
        img.render(&tool, &Projection::default(), 1, 1);
        assert_eq!(gpu.draws(), vec![(vec![0, 2], vec![2, 2])]);
    }

    #[test]
    fn test_shader_built_once() {
        let gpu = Rc::new(RecordingGpu::new());
        let mut img = image(&gpu);
        assert!(img.need_update());
        let tool = FixelToolSettings::default();
        img.render(&tool, &Projection::default(), 0, 0);
        assert!(!img.need_update());
        img.render(&tool, &Projection::default(), 0, 1);

        let programs: Vec<u64> = gpu
            .calls()
            .iter()
            .filter_map(|c| match c {
                GpuCall::UseProgram(id) => Some(*id),
                _ => None,
            })
            .collect();
        assert_eq!(programs.len(), 2);
        assert_eq!(programs[0], programs[1]);

        img.colour_type = ColourType::Direction;
        assert!(img.need_update());
    }

    #[test]
    fn test_uniforms() {
        let gpu = Rc::new(RecordingGpu::new());
        let mut img = image(&gpu);
        img.line_length_multiplier = 2.0;
        img.scale_line_length_by_value = true;
        img.colour = [1.0, 0.0, 0.5];
        let u = img.uniforms(&Projection::default());
        assert!((u.line_length - 0.9).abs() < 1e-6);
        assert_eq!(u.scale_line_length_by_value, 1);
        assert_eq!(u.max_value, 1.5);
        assert_eq!(u.const_colour, [1.0, 0.0, 0.5]);
        assert_eq!(u.lower, 0.25);
        assert_eq!(u.upper, 1.5);
        assert!((u.scale - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_out_of_range_slice_draws_nothing() {
        let gpu = Rc::new(RecordingGpu::new());
        let mut img = image(&gpu);
        gpu.take_calls();
        img.render(&FixelToolSettings::default(), &Projection::default(), 0, 9);
        img.render(&FixelToolSettings::default(), &Projection::default(), 5, 0);
        assert!(gpu.draws().is_empty());
        assert!(gpu.render_states().is_empty());
    }

    #[test]
    fn test_drop_releases_resources() {
        let gpu = Rc::new(RecordingGpu::new());
        drop(image(&gpu));
        assert_eq!(gpu.count(|c| matches!(c, GpuCall::DeleteBuffer(_))), 1);
        assert_eq!(gpu.count(|c| matches!(c, GpuCall::DeleteVertexLayout(_))), 1);
    }
}
