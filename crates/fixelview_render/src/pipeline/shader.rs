//! WGSL program synthesis for fixel lines
//!
//! The vertex and fragment programs are generated from a [`ShaderKey`]: the
//! colouring mode, the colour map and the display flags. Everything else the
//! programs need arrives through the fixed [`FixelUniforms`](super::FixelUniforms)
//! block, so only a key change requires a rebuild.
//!
//! Every segment is drawn as two vertices. The vertex buffer is bound three
//! times (`pos` one slot ahead, `prev` at the slot, `next` two slots ahead); the
//! odd vertex of a pair swaps to `centre = prev`, `dir = -pos`, so the two
//! vertices land on opposite ends of a segment centred on the voxel.

use std::collections::hash_map::DefaultHasher;
use std::fmt::Write as _;
use std::hash::{Hash, Hasher};

use fixelview_core::colourmap::{self, ColourMap, ColourType};
use fixelview_core::DisplayFlags;

const UNIFORM_BLOCK: &str = "\
struct FixelUniforms {
  mvp: mat4x4<f32>,
  const_colour: vec3<f32>,
  line_length: f32,
  max_value: f32,
  offset: f32,
  scale: f32,
  lower: f32,
  upper: f32,
  scale_line_length_by_value: u32,
  _padding: vec2<u32>,
};

@group(0) @binding(0) var<uniform> u: FixelUniforms;

";

/// Everything the generated source depends on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ShaderKey {
    pub colour_type: ColourType,
    pub colourmap: usize,
    pub flags: DisplayFlags,
}

impl ShaderKey {
    /// Active colour map, falling back to the default for unknown ids
    pub fn colour_map(&self) -> &'static ColourMap {
        colourmap::get(self.colourmap)
            .unwrap_or(&colourmap::MAPS[colourmap::DEFAULT_MAP])
    }

    /// Whether the active colour map does its own windowing
    pub fn special_map(&self) -> bool {
        self.colour_map().special
    }

    /// Vertex program source
    pub fn vertex_source(&self) -> String {
        let mut source = String::from(UNIFORM_BLOCK);
        source.push_str(
            "struct VertexOutput {
  @builtin(position) position: vec4<f32>,
  @location(0) @interpolate(flat) value_out: f32,
  @location(1) colour: vec3<f32>,
};

@vertex
fn vs_main(
  @builtin(vertex_index) vertex_index: u32,
  @location(0) pos: vec3<f32>,
  @location(1) prev: vec3<f32>,
  @location(2) next: vec3<f32>,
) -> VertexOutput {
  var out: VertexOutput;
  var centre = pos;
  var dir = next;
  if (vertex_index % 2u) == 1u {
    centre = prev;
    dir = -pos;
  }
  let value_out = length(dir);
  out.value_out = value_out;
  let ray = select(normalize(dir), dir, u.scale_line_length_by_value != 0u);
  out.position = u.mvp * vec4<f32>(centre + u.line_length * ray, 1.0);
",
        );

        match self.colour_type {
            ColourType::Colour => {
                source.push_str("  out.colour = u.const_colour;\n");
            }
            ColourType::Value => {
                let map = self.colour_map();
                if !map.special {
                    let invert = if self.flags.contains(DisplayFlags::SCALE_INVERTED) {
                        "1.0 - "
                    } else {
                        ""
                    };
                    let _ = writeln!(
                        source,
                        "  let amplitude = clamp({}u.scale * (value_out - u.offset), 0.0, 1.0);",
                        invert
                    );
                }
                source.push_str("  var color: vec3<f32>;\n");
                source.push_str(map.mapping);
                source.push_str("  out.colour = color;\n");
            }
            ColourType::Direction => {
                source.push_str("  out.colour = normalize(abs(dir));\n");
            }
        }

        source.push_str("  return out;\n}\n");
        source
    }

    /// Fragment program source
    pub fn fragment_source(&self) -> String {
        let mut source = String::from(UNIFORM_BLOCK);
        source.push_str(
            "struct FragmentInput {
  @location(0) @interpolate(flat) value_out: f32,
  @location(1) colour: vec3<f32>,
};

@fragment
fn fs_main(in: FragmentInput) -> @location(0) vec4<f32> {
",
        );
        if self.flags.contains(DisplayFlags::DISCARD_LOWER) {
            source.push_str("  if in.value_out < u.lower {\n    discard;\n  }\n");
        }
        if self.flags.contains(DisplayFlags::DISCARD_UPPER) {
            source.push_str("  if in.value_out > u.upper {\n    discard;\n  }\n");
        }
        source.push_str("  return vec4<f32>(in.colour, 1.0);\n}\n");
        source
    }

    /// Generate both programs
    pub fn build(&self) -> ShaderProgram {
        ShaderProgram::new(self.vertex_source(), self.fragment_source())
    }
}

/// Generated vertex and fragment source with a content id
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShaderProgram {
    id: u64,
    pub vertex: String,
    pub fragment: String,
}

impl ShaderProgram {
    pub fn new(vertex: String, fragment: String) -> Self {
        let mut hasher = DefaultHasher::new();
        vertex.hash(&mut hasher);
        fragment.hash(&mut hasher);
        Self {
            id: hasher.finish(),
            vertex,
            fragment,
        }
    }

    /// Hash of the source text; equal sources give equal ids
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }
}

/// Cached program for one fixel image
#[derive(Debug, Default)]
pub struct FixelShader {
    key: Option<ShaderKey>,
    program: Option<ShaderProgram>,
}

impl FixelShader {
    pub fn new() -> Self {
        Self::default()
    }

    /// True until a program exists for exactly this key
    pub fn need_update(&self, key: &ShaderKey) -> bool {
        self.key.as_ref() != Some(key)
    }

    /// Regenerate the program for `key`
    pub fn update(&mut self, key: ShaderKey) -> &ShaderProgram {
        log::debug!(
            "Rebuilding fixel shader: {:?}, colour map {}, flags {:?}",
            key.colour_type,
            key.colour_map().name,
            key.flags
        );
        self.key = Some(key);
        self.program.insert(key.build())
    }

    pub fn program(&self) -> Option<&ShaderProgram> {
        self.program.as_ref()
    }

    pub fn key(&self) -> Option<&ShaderKey> {
        self.key.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(colour_type: ColourType) -> ShaderKey {
        ShaderKey {
            colour_type,
            colourmap: colourmap::DEFAULT_MAP,
            flags: DisplayFlags::empty(),
        }
    }

    #[test]
    fn test_sources_are_deterministic() {
        let k = ShaderKey {
            colour_type: ColourType::Value,
            colourmap: 3,
            flags: DisplayFlags::DISCARD_LOWER | DisplayFlags::SCALE_INVERTED,
        };
        let a = k.build();
        let b = k.build();
        assert_eq!(a, b);
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_vertex_always_emits_parity_and_value() {
        for t in ColourType::ALL {
            let src = key(t).vertex_source();
            assert!(src.contains("(vertex_index % 2u) == 1u"));
            assert!(src.contains("dir = -pos;"));
            assert!(src.contains("out.value_out = value_out;"));
            assert!(src.contains("select(normalize(dir), dir, u.scale_line_length_by_value != 0u)"));
        }
    }

    #[test]
    fn test_colour_mode() {
        let src = key(ColourType::Colour).vertex_source();
        assert!(src.contains("out.colour = u.const_colour;"));
        assert!(!src.contains("amplitude"));
    }

    #[test]
    fn test_direction_mode() {
        let src = key(ColourType::Direction).vertex_source();
        assert!(src.contains("out.colour = normalize(abs(dir));"));
        assert!(!src.contains("amplitude"));
    }

    #[test]
    fn test_value_mode_formula_map() {
        let src = key(ColourType::Value).vertex_source();
        assert!(src.contains("let amplitude = clamp(u.scale * (value_out - u.offset), 0.0, 1.0);"));
        assert!(src.contains(colourmap::MAPS[colourmap::DEFAULT_MAP].mapping));
        assert!(src.contains("out.colour = color;"));
    }

    #[test]
    fn test_value_mode_inverted() {
        let mut k = key(ColourType::Value);
        k.flags = DisplayFlags::SCALE_INVERTED;
        let src = k.vertex_source();
        assert!(src.contains("clamp(1.0 - u.scale * (value_out - u.offset), 0.0, 1.0)"));
    }

    #[test]
    fn test_value_mode_special_map_skips_amplitude() {
        let special = colourmap::index_of("Colour").unwrap();
        let k = ShaderKey {
            colour_type: ColourType::Value,
            colourmap: special,
            flags: DisplayFlags::SCALE_INVERTED,
        };
        assert!(k.special_map());
        let src = k.vertex_source();
        assert!(!src.contains("let amplitude"));
        assert!(src.contains(colourmap::MAPS[special].mapping));
    }

    #[test]
    fn test_fragment_discards() {
        let mut k = key(ColourType::Direction);
        let plain = k.fragment_source();
        assert!(!plain.contains("discard"));
        assert!(plain.contains("return vec4<f32>(in.colour, 1.0);"));

        k.flags = DisplayFlags::DISCARD_LOWER;
        let lower = k.fragment_source();
        assert!(lower.contains("in.value_out < u.lower"));
        assert!(!lower.contains("in.value_out > u.upper"));

        k.flags = DisplayFlags::DISCARD_LOWER | DisplayFlags::DISCARD_UPPER;
        let both = k.fragment_source();
        let lo = both.find("u.lower").unwrap();
        let hi = both.find("u.upper {").unwrap();
        let ret = both.find("return").unwrap();
        assert!(lo < hi && hi < ret);
    }

    #[test]
    fn test_need_update_on_each_field() {
        let base = ShaderKey {
            colour_type: ColourType::Value,
            colourmap: 0,
            flags: DisplayFlags::empty(),
        };
        let mut shader = FixelShader::new();
        assert!(shader.need_update(&base));
        shader.update(base);
        assert!(!shader.need_update(&base));

        let variants = [
            ShaderKey { colour_type: ColourType::Direction, ..base },
            ShaderKey { colourmap: 4, ..base },
            ShaderKey { flags: DisplayFlags::DISCARD_LOWER, ..base },
            ShaderKey { flags: DisplayFlags::DISCARD_UPPER, ..base },
            ShaderKey { flags: DisplayFlags::SCALE_INVERTED, ..base },
        ];
        for v in variants {
            assert!(shader.need_update(&v), "{:?} should need an update", v);
        }
    }

    #[test]
    fn test_update_replaces_program() {
        let mut shader = FixelShader::new();
        let first = shader.update(key(ColourType::Value)).id();
        let second = shader.update(key(ColourType::Direction)).id();
        assert_ne!(first, second);
        assert_eq!(shader.program().unwrap().id(), second);
        assert_eq!(shader.key().unwrap().colour_type, ColourType::Direction);
    }
}
