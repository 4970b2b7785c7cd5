//! An in-memory [`Device`] that keeps the bookkeeping of an OpenGL context without a GPU.
//!
//! It tracks object tables, current bindings and uniform storage, and it raises the same error
//! codes a real context would for the mistakes the wrappers could make (binding a deleted object,
//! uploading with nothing bound, writing a uniform with no program in use, ...). Draw calls are
//! recorded instead of rasterized.
//!
//! The "compiler" only checks that a stage declares `main`; uniforms are discovered by scanning
//! `uniform <type> <name>;` declarations.

use std::collections::{BTreeMap, HashMap, HashSet};

use gl::types::GLenum;

use super::*;
use crate::error::{DeviceError, DeviceResult};

const DEFAULT_MAX_TEXTURE_UNITS: u32 = 16;

/// A uniform value as stored by the headless device.
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    Int(i32),
    Vec4([f32; 4]),
    Mat4([f32; 16]),
}

/// One recorded indexed draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub count: usize,
    pub vertex_array: Option<VertexArrayId>,
    pub element_buffer: Option<BufferId>,
    pub program: Option<ProgramId>,
    /// Texture bound on each unit at the time of the draw.
    pub textures: BTreeMap<u32, TextureId>,
}

/// The image storage and sampling parameters of a texture object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    pub min_filter: Option<Filter>,
    pub mag_filter: Option<Filter>,
    pub wrap_s: Option<Wrap>,
    pub wrap_t: Option<Wrap>,
}

#[derive(Debug, Default)]
struct VertexArrayState {
    element_buffer: Option<BufferId>,
    attribs: BTreeMap<u32, (bool, Option<(AttribPointer, BufferId)>)>,
}

#[derive(Debug)]
struct ShaderState {
    stage: ShaderStage,
    source: Option<String>,
    compiled: bool,
    info_log: String,
}

#[derive(Debug, Default)]
struct ProgramState {
    attached: Vec<ShaderId>,
    linked: bool,
    validated: bool,
    info_log: String,
    locations: HashMap<String, i32>,
    values: HashMap<i32, UniformValue>,
}

/// See the [module documentation](self).
#[derive(Debug)]
pub struct HeadlessDevice {
    next_id: u32,
    max_texture_units: u32,
    pending: Vec<GLenum>,

    buffers: HashMap<BufferId, Option<Vec<u8>>>,
    vertex_arrays: HashMap<VertexArrayId, VertexArrayState>,
    shaders: HashMap<ShaderId, ShaderState>,
    programs: HashMap<ProgramId, ProgramState>,
    textures: HashMap<TextureId, TextureImage>,

    array_buffer: Option<BufferId>,
    vertex_array: Option<VertexArrayId>,
    program: Option<ProgramId>,
    active_unit: u32,
    units: BTreeMap<u32, TextureId>,

    clear_color: [f32; 4],
    depth_test: bool,
    viewport: (i32, i32, i32, i32),
    clears: usize,
    draws: Vec<DrawCall>,
}

impl Default for HeadlessDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            max_texture_units: DEFAULT_MAX_TEXTURE_UNITS,
            pending: vec![],
            buffers: HashMap::new(),
            vertex_arrays: HashMap::new(),
            shaders: HashMap::new(),
            programs: HashMap::new(),
            textures: HashMap::new(),
            array_buffer: None,
            vertex_array: None,
            program: None,
            active_unit: 0,
            units: BTreeMap::new(),
            clear_color: [0.0; 4],
            depth_test: false,
            viewport: (0, 0, 0, 0),
            clears: 0,
            draws: vec![],
        }
    }

    /// Pretends the device has `units` combined texture image units.
    pub fn with_max_texture_units(mut self, units: u32) -> Self {
        self.max_texture_units = units;
        self
    }

    /// Queues an error code, as if the device had raised it. The next call reports it.
    pub fn inject_error(&mut self, code: GLenum) {
        self.pending.push(code);
    }

    pub fn draw_calls(&self) -> &[DrawCall] {
        &self.draws
    }

    pub fn clear_count(&self) -> usize {
        self.clears
    }

    pub fn clear_color_value(&self) -> [f32; 4] {
        self.clear_color
    }

    pub fn depth_test_enabled(&self) -> bool {
        self.depth_test
    }

    pub fn viewport_rect(&self) -> (i32, i32, i32, i32) {
        self.viewport
    }

    pub fn bound_array_buffer(&self) -> Option<BufferId> {
        self.array_buffer
    }

    pub fn bound_element_buffer(&self) -> Option<BufferId> {
        self.vertex_array
            .and_then(|va| self.vertex_arrays.get(&va))
            .and_then(|state| state.element_buffer)
    }

    pub fn bound_vertex_array(&self) -> Option<VertexArrayId> {
        self.vertex_array
    }

    pub fn current_program(&self) -> Option<ProgramId> {
        self.program
    }

    pub fn active_texture_unit(&self) -> u32 {
        self.active_unit
    }

    pub fn texture_on_unit(&self, unit: u32) -> Option<TextureId> {
        self.units.get(&unit).copied()
    }

    pub fn buffer_contents(&self, buffer: BufferId) -> Option<&[u8]> {
        self.buffers.get(&buffer).and_then(|b| b.as_deref())
    }

    pub fn texture_image(&self, texture: TextureId) -> Option<&TextureImage> {
        self.textures.get(&texture)
    }

    /// Enabled attribute slots of `array` with the pointer and source buffer recorded for each.
    pub fn attributes(&self, array: VertexArrayId) -> Vec<(AttribPointer, BufferId)> {
        self.vertex_arrays
            .get(&array)
            .map(|state| {
                state
                    .attribs
                    .values()
                    .filter(|(enabled, _)| *enabled)
                    .filter_map(|(_, pointer)| *pointer)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn uniform_value(&self, program: ProgramId, name: &str) -> Option<&UniformValue> {
        let state = self.programs.get(&program)?;
        let location = state.locations.get(name)?;
        state.values.get(location)
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.vertex_arrays.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn raise(&mut self, code: GLenum) {
        self.pending.push(code);
    }

    fn check(&mut self, call: &'static str, line: u32) -> DeviceResult<()> {
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(DeviceError {
                call,
                file: file!(),
                line,
                codes: self.pending.drain(..).collect(),
            })
        }
    }

    fn bound_buffer(&self, target: BufferTarget) -> Option<BufferId> {
        match target {
            BufferTarget::Array => self.array_buffer,
            BufferTarget::ElementArray => self.bound_element_buffer(),
        }
    }

    fn bound_texture(&self) -> Option<TextureId> {
        self.units.get(&self.active_unit).copied()
    }

    fn write_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let program = match self.program {
            Some(program) => program,
            None => return self.raise(gl::INVALID_OPERATION),
        };

        if location.is_absent() {
            return;
        }

        match self.programs.get_mut(&program) {
            Some(state) if state.locations.values().any(|&l| l == location.0) => {
                state.values.insert(location.0, value);
            }
            _ => self.raise(gl::INVALID_OPERATION),
        }
    }

    fn linked_program(&mut self, program: ProgramId) -> Option<&ProgramState> {
        let error = match self.programs.get(&program) {
            Some(state) if state.linked => None,
            Some(_) => Some(gl::INVALID_OPERATION),
            None => Some(gl::INVALID_VALUE),
        };

        match error {
            Some(code) => {
                self.raise(code);
                None
            }
            None => self.programs.get(&program),
        }
    }
}

/// Finds the names declared by `uniform <type> <name>;` lines.
fn declared_uniforms(source: &str) -> Vec<String> {
    source
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with("uniform "))
        .filter_map(|line| {
            let decl = line.trim_end_matches(';').trim();
            let name = decl.split_whitespace().last()?;
            let name = name.split('[').next().unwrap_or(name);
            Some(name.to_string())
        })
        .collect()
}

fn declares_main(source: &str) -> bool {
    source.contains("void main")
}

impl Device for HeadlessDevice {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn create_buffer(&mut self) -> DeviceResult<BufferId> {
        let id = BufferId(self.next_id());
        self.buffers.insert(id, None);
        self.check("create_buffer", line!()).map(|_| id)
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) -> DeviceResult<()> {
        if let Some(id) = buffer {
            if !self.buffers.contains_key(&id) {
                self.raise(gl::INVALID_OPERATION);
                return self.check("bind_buffer", line!());
            }
        }

        match target {
            BufferTarget::Array => self.array_buffer = buffer,
            BufferTarget::ElementArray => match self.vertex_array {
                Some(va) => {
                    if let Some(state) = self.vertex_arrays.get_mut(&va) {
                        state.element_buffer = buffer;
                    }
                }
                // Core profiles have no default vertex array to hold the binding
                None => self.raise(gl::INVALID_OPERATION),
            },
        }

        self.check("bind_buffer", line!())
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8]) -> DeviceResult<()> {
        match self.bound_buffer(target) {
            Some(id) => {
                self.buffers.insert(id, Some(data.to_vec()));
            }
            None => self.raise(gl::INVALID_OPERATION),
        }

        self.check("buffer_data", line!())
    }

    fn buffer_size(&mut self, target: BufferTarget) -> DeviceResult<usize> {
        let size = match self.bound_buffer(target) {
            Some(id) => self.buffers[&id].as_ref().map_or(0, Vec::len),
            None => {
                self.raise(gl::INVALID_OPERATION);
                0
            }
        };

        self.check("buffer_size", line!()).map(|_| size)
    }

    fn delete_buffer(&mut self, buffer: BufferId) -> DeviceResult<()> {
        if self.buffers.remove(&buffer).is_some() {
            if self.array_buffer == Some(buffer) {
                self.array_buffer = None;
            }
            for state in self.vertex_arrays.values_mut() {
                if state.element_buffer == Some(buffer) {
                    state.element_buffer = None;
                }
            }
        }

        self.check("delete_buffer", line!())
    }

    fn create_vertex_array(&mut self) -> DeviceResult<VertexArrayId> {
        let id = VertexArrayId(self.next_id());
        self.vertex_arrays.insert(id, VertexArrayState::default());
        self.check("create_vertex_array", line!()).map(|_| id)
    }

    fn bind_vertex_array(&mut self, array: Option<VertexArrayId>) -> DeviceResult<()> {
        match array {
            Some(id) if !self.vertex_arrays.contains_key(&id) => self.raise(gl::INVALID_OPERATION),
            _ => self.vertex_array = array,
        }

        self.check("bind_vertex_array", line!())
    }

    fn enable_vertex_attrib(&mut self, index: u32) -> DeviceResult<()> {
        match self.vertex_array.and_then(|va| self.vertex_arrays.get_mut(&va)) {
            Some(state) => state.attribs.entry(index).or_insert((false, None)).0 = true,
            None => self.raise(gl::INVALID_OPERATION),
        }

        self.check("enable_vertex_attrib", line!())
    }

    fn vertex_attrib_pointer(&mut self, pointer: &AttribPointer) -> DeviceResult<()> {
        if !(1..=4).contains(&pointer.components) {
            self.raise(gl::INVALID_VALUE);
            return self.check("vertex_attrib_pointer", line!());
        }

        let source = self.array_buffer;
        match (self.vertex_array.and_then(|va| self.vertex_arrays.get_mut(&va)), source) {
            (Some(state), Some(buffer)) => {
                let slot = state.attribs.entry(pointer.index).or_insert((false, None));
                slot.1 = Some((*pointer, buffer));
            }
            _ => self.raise(gl::INVALID_OPERATION),
        }

        self.check("vertex_attrib_pointer", line!())
    }

    fn delete_vertex_array(&mut self, array: VertexArrayId) -> DeviceResult<()> {
        self.vertex_arrays.remove(&array);
        if self.vertex_array == Some(array) {
            self.vertex_array = None;
        }

        self.check("delete_vertex_array", line!())
    }

    fn create_shader(&mut self, stage: ShaderStage) -> DeviceResult<ShaderId> {
        let id = ShaderId(self.next_id());
        self.shaders.insert(
            id,
            ShaderState {
                stage,
                source: None,
                compiled: false,
                info_log: String::new(),
            },
        );
        self.check("create_shader", line!()).map(|_| id)
    }

    fn compile_shader(&mut self, shader: ShaderId, source: &str) -> DeviceResult<()> {
        match self.shaders.get_mut(&shader) {
            Some(state) => {
                state.source = Some(source.to_string());
                state.compiled = declares_main(source);
                state.info_log = if state.compiled {
                    String::new()
                } else {
                    format!("ERROR: 0:1: '{}' stage: no function 'main' defined", state.stage)
                };
            }
            None => self.raise(gl::INVALID_VALUE),
        }

        self.check("compile_shader", line!())
    }

    fn shader_compiled(&mut self, shader: ShaderId) -> DeviceResult<bool> {
        let compiled = match self.shaders.get(&shader) {
            Some(state) => state.compiled,
            None => {
                self.raise(gl::INVALID_VALUE);
                false
            }
        };

        self.check("shader_compiled", line!()).map(|_| compiled)
    }

    fn shader_info_log(&mut self, shader: ShaderId) -> DeviceResult<String> {
        let log = match self.shaders.get(&shader) {
            Some(state) => state.info_log.clone(),
            None => {
                self.raise(gl::INVALID_VALUE);
                String::new()
            }
        };

        self.check("shader_info_log", line!()).map(|_| log)
    }

    fn delete_shader(&mut self, shader: ShaderId) -> DeviceResult<()> {
        // Deleting an attached shader only flags it in GL, but nothing here reads a shader after
        // linking, so drop it right away
        self.shaders.remove(&shader);
        self.check("delete_shader", line!())
    }

    fn create_program(&mut self) -> DeviceResult<ProgramId> {
        let id = ProgramId(self.next_id());
        self.programs.insert(id, ProgramState::default());
        self.check("create_program", line!()).map(|_| id)
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) -> DeviceResult<()> {
        match (self.programs.get_mut(&program), self.shaders.contains_key(&shader)) {
            (Some(state), true) if !state.attached.contains(&shader) => state.attached.push(shader),
            (Some(_), true) => self.raise(gl::INVALID_OPERATION),
            _ => self.raise(gl::INVALID_VALUE),
        }

        self.check("attach_shader", line!())
    }

    fn link_program(&mut self, program: ProgramId) -> DeviceResult<()> {
        let attached = match self.programs.get(&program) {
            Some(state) => state.attached.clone(),
            None => {
                self.raise(gl::INVALID_VALUE);
                return self.check("link_program", line!());
            }
        };

        let mut stages = HashSet::new();
        let mut names = vec![];
        let mut problems = vec![];
        for id in &attached {
            let shader = match self.shaders.get(id) {
                Some(shader) => shader,
                None => {
                    problems.push(format!("shader {} was deleted before linking", id.0));
                    continue;
                }
            };
            stages.insert(shader.stage);
            if !shader.compiled {
                problems.push(format!("{} shader {} is not compiled", shader.stage, id.0));
            }
            for name in declared_uniforms(shader.source.as_deref().unwrap_or("")) {
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }

        for stage in &[ShaderStage::Vertex, ShaderStage::Fragment] {
            if !stages.contains(stage) {
                problems.push(format!("no {} shader attached", stage));
            }
        }

        let state = match self.programs.get_mut(&program) {
            Some(state) => state,
            None => return self.check("link_program", line!()),
        };
        state.linked = problems.is_empty();
        state.validated = false;
        state.info_log = problems.join("\n");
        state.values.clear();
        state.locations = if state.linked {
            names.into_iter().enumerate().map(|(i, name)| (name, i as i32)).collect()
        } else {
            HashMap::new()
        };

        self.check("link_program", line!())
    }

    fn validate_program(&mut self, program: ProgramId) -> DeviceResult<()> {
        match self.programs.get_mut(&program) {
            Some(state) => {
                state.validated = state.linked;
                if !state.linked {
                    state.info_log = String::from("program is not linked");
                }
            }
            None => self.raise(gl::INVALID_VALUE),
        }

        self.check("validate_program", line!())
    }

    fn program_status(&mut self, program: ProgramId, status: ProgramStatus) -> DeviceResult<bool> {
        let value = match self.programs.get(&program) {
            Some(state) => match status {
                ProgramStatus::Link => state.linked,
                ProgramStatus::Validate => state.validated,
            },
            None => {
                self.raise(gl::INVALID_VALUE);
                false
            }
        };

        self.check("program_status", line!()).map(|_| value)
    }

    fn program_info_log(&mut self, program: ProgramId) -> DeviceResult<String> {
        let log = match self.programs.get(&program) {
            Some(state) => state.info_log.clone(),
            None => {
                self.raise(gl::INVALID_VALUE);
                String::new()
            }
        };

        self.check("program_info_log", line!()).map(|_| log)
    }

    fn use_program(&mut self, program: Option<ProgramId>) -> DeviceResult<()> {
        match program {
            Some(id) => {
                if self.linked_program(id).is_some() {
                    self.program = Some(id);
                }
            }
            None => self.program = None,
        }

        self.check("use_program", line!())
    }

    fn delete_program(&mut self, program: ProgramId) -> DeviceResult<()> {
        self.programs.remove(&program);
        if self.program == Some(program) {
            self.program = None;
        }

        self.check("delete_program", line!())
    }

    fn uniform_location(
        &mut self,
        program: ProgramId,
        name: &str,
    ) -> DeviceResult<UniformLocation> {
        let location = self
            .linked_program(program)
            .map(|state| state.locations.get(name).copied().unwrap_or(-1))
            .unwrap_or(-1);

        self.check("uniform_location", line!()).map(|_| UniformLocation(location))
    }

    fn uniform_1i(&mut self, location: UniformLocation, value: i32) -> DeviceResult<()> {
        self.write_uniform(location, UniformValue::Int(value));
        self.check("uniform_1i", line!())
    }

    fn uniform_4f(&mut self, location: UniformLocation, value: [f32; 4]) -> DeviceResult<()> {
        self.write_uniform(location, UniformValue::Vec4(value));
        self.check("uniform_4f", line!())
    }

    fn uniform_matrix_4f(
        &mut self,
        location: UniformLocation,
        columns: &[f32; 16],
    ) -> DeviceResult<()> {
        self.write_uniform(location, UniformValue::Mat4(*columns));
        self.check("uniform_matrix_4f", line!())
    }

    fn read_uniform_f(
        &mut self,
        program: ProgramId,
        location: UniformLocation,
        out: &mut [f32],
    ) -> DeviceResult<()> {
        let value = self
            .linked_program(program)
            .map(|state| state.values.get(&location.0).cloned());

        match value {
            Some(Some(UniformValue::Int(v))) => {
                if let Some(first) = out.first_mut() {
                    *first = v as f32;
                }
            }
            Some(Some(UniformValue::Vec4(v))) => {
                let n = out.len().min(4);
                out[..n].copy_from_slice(&v[..n]);
            }
            Some(Some(UniformValue::Mat4(v))) => {
                let n = out.len().min(16);
                out[..n].copy_from_slice(&v[..n]);
            }
            // Never written: uniforms start out zeroed
            Some(None) if !location.is_absent() => out.iter_mut().for_each(|v| *v = 0.0),
            Some(None) => self.raise(gl::INVALID_OPERATION),
            None => {}
        }

        self.check("read_uniform_f", line!())
    }

    fn read_uniform_i(
        &mut self,
        program: ProgramId,
        location: UniformLocation,
    ) -> DeviceResult<i32> {
        let value = self
            .linked_program(program)
            .map(|state| state.values.get(&location.0).cloned());

        let result = match value {
            Some(Some(UniformValue::Int(v))) => v,
            Some(Some(UniformValue::Vec4(v))) => v[0] as i32,
            Some(Some(UniformValue::Mat4(v))) => v[0] as i32,
            Some(None) if !location.is_absent() => 0,
            Some(None) => {
                self.raise(gl::INVALID_OPERATION);
                0
            }
            None => 0,
        };

        self.check("read_uniform_i", line!()).map(|_| result)
    }

    fn create_texture(&mut self) -> DeviceResult<TextureId> {
        let id = TextureId(self.next_id());
        self.textures.insert(id, TextureImage::default());
        self.check("create_texture", line!()).map(|_| id)
    }

    fn active_texture(&mut self, unit: u32) -> DeviceResult<()> {
        if unit < self.max_texture_units {
            self.active_unit = unit;
        } else {
            self.raise(gl::INVALID_ENUM);
        }

        self.check("active_texture", line!())
    }

    fn bind_texture(&mut self, texture: Option<TextureId>) -> DeviceResult<()> {
        match texture {
            Some(id) if !self.textures.contains_key(&id) => self.raise(gl::INVALID_OPERATION),
            Some(id) => {
                self.units.insert(self.active_unit, id);
            }
            None => {
                self.units.remove(&self.active_unit);
            }
        }

        self.check("bind_texture", line!())
    }

    fn texture_parameter(&mut self, parameter: TextureParameter) -> DeviceResult<()> {
        let bound = self.bound_texture();
        match bound.and_then(|id| self.textures.get_mut(&id)) {
            Some(image) => match parameter {
                TextureParameter::MinFilter(f) => image.min_filter = Some(f),
                TextureParameter::MagFilter(f) => image.mag_filter = Some(f),
                TextureParameter::WrapS(w) => image.wrap_s = Some(w),
                TextureParameter::WrapT(w) => image.wrap_t = Some(w),
            },
            None => self.raise(gl::INVALID_OPERATION),
        }

        self.check("texture_parameter", line!())
    }

    fn texture_image_rgba8(&mut self, width: u32, height: u32, pixels: &[u8]) -> DeviceResult<()> {
        let expected = width as usize * height as usize * 4;
        let bound = self.bound_texture();

        match bound.and_then(|id| self.textures.get_mut(&id)) {
            Some(_) if pixels.len() != expected => self.raise(gl::INVALID_VALUE),
            Some(image) => {
                image.width = width;
                image.height = height;
                image.pixels = pixels.to_vec();
            }
            None => self.raise(gl::INVALID_OPERATION),
        }

        self.check("texture_image_rgba8", line!())
    }

    fn delete_texture(&mut self, texture: TextureId) -> DeviceResult<()> {
        self.textures.remove(&texture);
        self.units.retain(|_, bound| *bound != texture);
        self.check("delete_texture", line!())
    }

    fn max_texture_units(&mut self) -> DeviceResult<u32> {
        let units = self.max_texture_units;
        self.check("max_texture_units", line!()).map(|_| units)
    }

    fn viewport(&mut self, x: i32, y: i32, width: i32, height: i32) -> DeviceResult<()> {
        if width < 0 || height < 0 {
            self.raise(gl::INVALID_VALUE);
        } else {
            self.viewport = (x, y, width, height);
        }

        self.check("viewport", line!())
    }

    fn clear_color(&mut self, rgba: [f32; 4]) -> DeviceResult<()> {
        self.clear_color = rgba;
        self.check("clear_color", line!())
    }

    fn enable_depth_test(&mut self) -> DeviceResult<()> {
        self.depth_test = true;
        self.check("enable_depth_test", line!())
    }

    fn clear(&mut self, _depth: bool) -> DeviceResult<()> {
        self.clears += 1;
        self.check("clear", line!())
    }

    fn draw_triangles_indexed(&mut self, count: usize) -> DeviceResult<()> {
        let element_buffer = self.bound_element_buffer();

        match (self.vertex_array, self.program, element_buffer) {
            (Some(_), Some(_), Some(buffer)) => {
                let available = self.buffers[&buffer].as_ref().map_or(0, Vec::len) / 4;
                if count > available {
                    self.raise(gl::INVALID_OPERATION);
                } else {
                    self.draws.push(DrawCall {
                        count,
                        vertex_array: self.vertex_array,
                        element_buffer,
                        program: self.program,
                        textures: self.units.clone(),
                    });
                }
            }
            _ => self.raise(gl::INVALID_OPERATION),
        }

        self.check("draw_triangles_indexed", line!())
    }
}
