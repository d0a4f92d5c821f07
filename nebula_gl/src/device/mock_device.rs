/// Mock GraphicsDevice for tests (no GPU required)
///
/// Behaves like a small GL driver: it hands out object names, keeps buffer
/// contents, "compiles" shaders with a few syntax checks, links programs and
/// records uniforms. Misuse pushes the same codes a real driver would onto an
/// error queue. Counters and a call log let tests verify that every object was
/// released.

use std::cell::RefCell;
use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::device::{BufferTarget, GlErrorCode, GraphicsDevice, RawHandle, ShaderStage, GL_NO_ERROR};

// ============================================================================
// Mock objects
// ============================================================================

#[derive(Debug, Clone)]
struct MockShader {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    info_log: String,
}

#[derive(Debug, Clone, Default)]
struct MockProgram {
    attached: Vec<RawHandle>,
    linked: bool,
    validated: bool,
    info_log: String,
    uniforms: Vec<String>,
    uniform_values: FxHashMap<i32, [f32; 4]>,
}

#[derive(Debug, Default)]
struct MockState {
    next_handle: RawHandle,
    errors: VecDeque<u32>,
    buffers: FxHashMap<RawHandle, Vec<u8>>,
    bound_buffers: FxHashMap<BufferTarget, RawHandle>,
    shaders: FxHashMap<RawHandle, MockShader>,
    programs: FxHashMap<RawHandle, MockProgram>,
    current_program: RawHandle,
    calls: Vec<String>,

    buffers_created: usize,
    buffers_deleted: usize,
    shaders_created: usize,
    shaders_deleted: usize,
    programs_created: usize,
    programs_deleted: usize,

    fail_next_create: bool,
    fail_next_upload: Option<GlErrorCode>,
    fail_validation: bool,
}

impl MockState {
    fn allocate(&mut self) -> RawHandle {
        self.next_handle += 1;
        self.next_handle
    }

    fn raise(&mut self, code: GlErrorCode) {
        self.errors.push_back(code.to_raw());
    }

    fn take_create_failure(&mut self) -> bool {
        std::mem::take(&mut self.fail_next_create)
    }
}

/// Check a stage source the way a strict GLSL front end would reject obvious garbage
fn mock_compile(source: &str) -> Result<(), String> {
    if source.trim().is_empty() {
        return Err("ERROR: 0:1: '' : syntax error: empty shader source\n".to_string());
    }

    let mut depth: i64 = 0;
    for (index, line) in source.lines().enumerate() {
        for ch in line.chars() {
            match ch {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return Err(format!("ERROR: 0:{}: '}}' : syntax error: unexpected closing brace\n", index + 1));
            }
        }
    }
    if depth != 0 {
        let last_line = source.lines().count().max(1);
        return Err(format!("ERROR: 0:{}: '' : syntax error: unexpected end of file, unbalanced braces\n", last_line));
    }

    if !source.contains("void main") {
        return Err("ERROR: 0:1: 'main' : function not defined\n".to_string());
    }

    Ok(())
}

/// Names declared with `uniform <type> <name>;`
fn declared_uniforms(source: &str) -> Vec<String> {
    source.lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix("uniform "))
        .filter_map(|rest| {
            let declaration = rest.split(';').next()?;
            let name = declaration.split_whitespace().last()?;
            Some(name.split('[').next().unwrap_or(name).to_string())
        })
        .collect()
}

// ============================================================================
// MockDevice
// ============================================================================

/// In-memory driver stub
#[derive(Debug, Default)]
pub struct MockDevice {
    state: RefCell<MockState>,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::default()
    }

    // ===== FAULT INJECTION =====

    /// Queue an error code as if an earlier call had raised it
    pub fn push_error(&self, code: GlErrorCode) {
        self.state.borrow_mut().raise(code);
    }

    /// Make the next gen_buffer/create_shader/create_program return 0
    pub fn fail_next_create(&self) {
        self.state.borrow_mut().fail_next_create = true;
    }

    /// Make the next buffer_data raise `code` and store nothing
    pub fn fail_next_upload(&self, code: GlErrorCode) {
        self.state.borrow_mut().fail_next_upload = Some(code);
    }

    /// Make glValidateProgram report failure for linked programs
    pub fn set_fail_validation(&self, fail: bool) {
        self.state.borrow_mut().fail_validation = fail;
    }

    // ===== INSPECTION =====

    pub fn live_buffers(&self) -> usize {
        self.state.borrow().buffers.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.state.borrow().shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.state.borrow().programs.len()
    }

    pub fn buffers_deleted(&self) -> usize {
        self.state.borrow().buffers_deleted
    }

    pub fn shaders_created(&self) -> usize {
        self.state.borrow().shaders_created
    }

    pub fn shaders_deleted(&self) -> usize {
        self.state.borrow().shaders_deleted
    }

    pub fn programs_deleted(&self) -> usize {
        self.state.borrow().programs_deleted
    }

    /// Whether `shader` names a live shader object
    pub fn is_shader(&self, shader: RawHandle) -> bool {
        self.state.borrow().shaders.contains_key(&shader)
    }

    /// Whether `buffer` names a live buffer object
    pub fn is_buffer(&self, buffer: RawHandle) -> bool {
        self.state.borrow().buffers.contains_key(&buffer)
    }

    /// Whether `program` names a live program object
    pub fn is_program(&self, program: RawHandle) -> bool {
        self.state.borrow().programs.contains_key(&program)
    }

    /// Contents of a live buffer
    pub fn buffer_contents(&self, buffer: RawHandle) -> Option<Vec<u8>> {
        self.state.borrow().buffers.get(&buffer).cloned()
    }

    /// Handle bound to `target` (0 when nothing is bound)
    pub fn bound_buffer(&self, target: BufferTarget) -> RawHandle {
        self.state.borrow().bound_buffers.get(&target).copied().unwrap_or(0)
    }

    pub fn current_program(&self) -> RawHandle {
        self.state.borrow().current_program
    }

    /// Shaders attached to a program at link time
    pub fn attached_shaders(&self, program: RawHandle) -> Vec<RawHandle> {
        self.state.borrow().programs.get(&program)
            .map(|p| p.attached.clone())
            .unwrap_or_default()
    }

    /// Last value set for a uniform location of `program`
    pub fn uniform_value(&self, program: RawHandle, location: i32) -> Option<[f32; 4]> {
        self.state.borrow().programs.get(&program)?
            .uniform_values.get(&location).copied()
    }

    /// Codes still waiting in the error queue
    pub fn pending_errors(&self) -> usize {
        self.state.borrow().errors.len()
    }

    /// Every driver call made so far, e.g. "bind_buffer(Vertex, 1)"
    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    /// Number of calls to the entry point `name`
    pub fn count_calls(&self, name: &str) -> usize {
        self.state.borrow().calls.iter()
            .filter(|call| call.split('(').next() == Some(name))
            .count()
    }

    fn record(&self, call: String) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl GraphicsDevice for MockDevice {
    fn version(&self) -> String {
        "3.3.0 Nebula Mock Driver".to_string()
    }

    fn get_error(&self) -> u32 {
        self.state.borrow_mut().errors.pop_front().unwrap_or(GL_NO_ERROR)
    }

    // ===== BUFFERS =====

    fn gen_buffer(&self) -> RawHandle {
        self.record("gen_buffer()".to_string());
        let mut state = self.state.borrow_mut();
        if state.take_create_failure() {
            state.raise(GlErrorCode::OutOfMemory);
            return 0;
        }
        let handle = state.allocate();
        state.buffers.insert(handle, Vec::new());
        state.buffers_created += 1;
        handle
    }

    fn bind_buffer(&self, target: BufferTarget, buffer: RawHandle) {
        self.record(format!("bind_buffer({:?}, {})", target, buffer));
        let mut state = self.state.borrow_mut();
        if buffer == 0 {
            state.bound_buffers.remove(&target);
        } else if state.buffers.contains_key(&buffer) {
            state.bound_buffers.insert(target, buffer);
        } else {
            state.raise(GlErrorCode::InvalidOperation);
        }
    }

    fn buffer_data(&self, target: BufferTarget, data: &[u8]) {
        self.record(format!("buffer_data({:?}, {})", target, data.len()));
        let mut state = self.state.borrow_mut();
        if let Some(code) = state.fail_next_upload.take() {
            state.raise(code);
            return;
        }
        match state.bound_buffers.get(&target).copied() {
            Some(handle) => {
                state.buffers.insert(handle, data.to_vec());
            }
            None => state.raise(GlErrorCode::InvalidOperation),
        }
    }

    fn get_buffer_sub_data(&self, target: BufferTarget, offset: usize, dst: &mut [u8]) {
        self.record(format!("get_buffer_sub_data({:?}, {}, {})", target, offset, dst.len()));
        let mut state = self.state.borrow_mut();
        let Some(handle) = state.bound_buffers.get(&target).copied() else {
            state.raise(GlErrorCode::InvalidOperation);
            return;
        };
        let contents = &state.buffers[&handle];
        match offset.checked_add(dst.len()) {
            Some(end) if end <= contents.len() => dst.copy_from_slice(&contents[offset..end]),
            _ => state.raise(GlErrorCode::InvalidValue),
        }
    }

    fn delete_buffer(&self, buffer: RawHandle) {
        self.record(format!("delete_buffer({})", buffer));
        let mut state = self.state.borrow_mut();
        if state.buffers.remove(&buffer).is_some() {
            state.buffers_deleted += 1;
            state.bound_buffers.retain(|_, bound| *bound != buffer);
        }
    }

    // ===== SHADERS =====

    fn create_shader(&self, stage: ShaderStage) -> RawHandle {
        self.record(format!("create_shader({:?})", stage));
        let mut state = self.state.borrow_mut();
        if state.take_create_failure() {
            state.raise(GlErrorCode::OutOfMemory);
            return 0;
        }
        let handle = state.allocate();
        state.shaders.insert(handle, MockShader {
            stage,
            source: String::new(),
            compiled: false,
            info_log: String::new(),
        });
        state.shaders_created += 1;
        handle
    }

    fn shader_source(&self, shader: RawHandle, source: &str) {
        self.record(format!("shader_source({})", shader));
        let mut state = self.state.borrow_mut();
        match state.shaders.get_mut(&shader) {
            Some(object) => object.source = source.to_string(),
            None => state.raise(GlErrorCode::InvalidValue),
        }
    }

    fn compile_shader(&self, shader: RawHandle) {
        self.record(format!("compile_shader({})", shader));
        let mut state = self.state.borrow_mut();
        match state.shaders.get_mut(&shader) {
            Some(object) => match mock_compile(&object.source) {
                Ok(()) => {
                    object.compiled = true;
                    object.info_log.clear();
                }
                Err(log) => {
                    object.compiled = false;
                    object.info_log = log;
                }
            },
            None => state.raise(GlErrorCode::InvalidValue),
        }
    }

    fn get_shader_compile_status(&self, shader: RawHandle) -> bool {
        self.record(format!("get_shader_compile_status({})", shader));
        let mut state = self.state.borrow_mut();
        match state.shaders.get(&shader) {
            Some(object) => object.compiled,
            None => {
                state.raise(GlErrorCode::InvalidValue);
                false
            }
        }
    }

    fn get_shader_info_log(&self, shader: RawHandle) -> String {
        self.record(format!("get_shader_info_log({})", shader));
        let mut state = self.state.borrow_mut();
        match state.shaders.get(&shader) {
            Some(object) => object.info_log.clone(),
            None => {
                state.raise(GlErrorCode::InvalidValue);
                String::new()
            }
        }
    }

    fn delete_shader(&self, shader: RawHandle) {
        self.record(format!("delete_shader({})", shader));
        if shader == 0 {
            return;
        }
        let mut state = self.state.borrow_mut();
        if state.shaders.remove(&shader).is_some() {
            state.shaders_deleted += 1;
        } else {
            state.raise(GlErrorCode::InvalidValue);
        }
    }

    // ===== PROGRAMS =====

    fn create_program(&self) -> RawHandle {
        self.record("create_program()".to_string());
        let mut state = self.state.borrow_mut();
        if state.take_create_failure() {
            state.raise(GlErrorCode::OutOfMemory);
            return 0;
        }
        let handle = state.allocate();
        state.programs.insert(handle, MockProgram::default());
        state.programs_created += 1;
        handle
    }

    fn attach_shader(&self, program: RawHandle, shader: RawHandle) {
        self.record(format!("attach_shader({}, {})", program, shader));
        let mut state = self.state.borrow_mut();
        if !state.shaders.contains_key(&shader) {
            state.raise(GlErrorCode::InvalidValue);
            return;
        }
        match state.programs.get_mut(&program) {
            Some(object) if object.attached.contains(&shader) => {
                state.raise(GlErrorCode::InvalidOperation);
            }
            Some(object) => object.attached.push(shader),
            None => state.raise(GlErrorCode::InvalidValue),
        }
    }

    fn link_program(&self, program: RawHandle) {
        self.record(format!("link_program({})", program));
        let mut state = self.state.borrow_mut();
        let Some(attached) = state.programs.get(&program).map(|p| p.attached.clone()) else {
            state.raise(GlErrorCode::InvalidValue);
            return;
        };

        let stages: Vec<&MockShader> = attached.iter()
            .filter_map(|handle| state.shaders.get(handle))
            .collect();
        let compiled_stage = |stage: ShaderStage| {
            stages.iter().filter(|s| s.stage == stage && s.compiled).count()
        };

        let mut problems = Vec::new();
        if stages.iter().any(|s| !s.compiled) {
            problems.push("error: attached shader was not compiled successfully".to_string());
        }
        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            match compiled_stage(stage) {
                0 => problems.push(format!("error: no compiled {} shader attached", stage)),
                1 => {}
                _ => problems.push(format!("error: multiple {} shaders attached", stage)),
            }
        }

        let uniforms: Vec<String> = if problems.is_empty() {
            let mut names = Vec::new();
            for shader in &stages {
                for name in declared_uniforms(&shader.source) {
                    if !names.contains(&name) {
                        names.push(name);
                    }
                }
            }
            names
        } else {
            Vec::new()
        };

        if let Some(object) = state.programs.get_mut(&program) {
            object.linked = problems.is_empty();
            object.validated = false;
            object.info_log = problems.join("\n");
            object.uniforms = uniforms;
            object.uniform_values.clear();
        }
    }

    fn get_program_link_status(&self, program: RawHandle) -> bool {
        self.record(format!("get_program_link_status({})", program));
        let mut state = self.state.borrow_mut();
        match state.programs.get(&program) {
            Some(object) => object.linked,
            None => {
                state.raise(GlErrorCode::InvalidValue);
                false
            }
        }
    }

    fn validate_program(&self, program: RawHandle) {
        self.record(format!("validate_program({})", program));
        let mut state = self.state.borrow_mut();
        let fail_validation = state.fail_validation;
        match state.programs.get_mut(&program) {
            Some(object) => {
                object.validated = object.linked && !fail_validation;
                if object.linked && fail_validation {
                    object.info_log = "validation error: program cannot execute in the current state".to_string();
                }
            }
            None => state.raise(GlErrorCode::InvalidValue),
        }
    }

    fn get_program_validate_status(&self, program: RawHandle) -> bool {
        self.record(format!("get_program_validate_status({})", program));
        let mut state = self.state.borrow_mut();
        match state.programs.get(&program) {
            Some(object) => object.validated,
            None => {
                state.raise(GlErrorCode::InvalidValue);
                false
            }
        }
    }

    fn get_program_info_log(&self, program: RawHandle) -> String {
        self.record(format!("get_program_info_log({})", program));
        let mut state = self.state.borrow_mut();
        match state.programs.get(&program) {
            Some(object) => object.info_log.clone(),
            None => {
                state.raise(GlErrorCode::InvalidValue);
                String::new()
            }
        }
    }

    fn use_program(&self, program: RawHandle) {
        self.record(format!("use_program({})", program));
        let mut state = self.state.borrow_mut();
        if program == 0 {
            state.current_program = 0;
            return;
        }
        match state.programs.get(&program).map(|p| p.linked) {
            Some(true) => state.current_program = program,
            Some(false) => state.raise(GlErrorCode::InvalidOperation),
            None => state.raise(GlErrorCode::InvalidValue),
        }
    }

    fn get_uniform_location(&self, program: RawHandle, name: &str) -> i32 {
        self.record(format!("get_uniform_location({}, {})", program, name));
        let mut state = self.state.borrow_mut();
        match state.programs.get(&program) {
            Some(object) if object.linked => object.uniforms.iter()
                .position(|uniform| uniform == name)
                .map(|index| index as i32)
                .unwrap_or(-1),
            Some(_) => {
                state.raise(GlErrorCode::InvalidOperation);
                -1
            }
            None => {
                state.raise(GlErrorCode::InvalidValue);
                -1
            }
        }
    }

    fn uniform_4f(&self, location: i32, value: [f32; 4]) {
        self.record(format!("uniform_4f({})", location));
        let mut state = self.state.borrow_mut();
        let current = state.current_program;
        if current == 0 {
            state.raise(GlErrorCode::InvalidOperation);
            return;
        }
        if location == -1 {
            return;
        }
        let Some(object) = state.programs.get_mut(&current) else {
            state.raise(GlErrorCode::InvalidOperation);
            return;
        };
        if location < 0 || location as usize >= object.uniforms.len() {
            state.raise(GlErrorCode::InvalidOperation);
            return;
        }
        object.uniform_values.insert(location, value);
    }

    fn delete_program(&self, program: RawHandle) {
        self.record(format!("delete_program({})", program));
        if program == 0 {
            return;
        }
        let mut state = self.state.borrow_mut();
        if state.programs.remove(&program).is_some() {
            state.programs_deleted += 1;
            if state.current_program == program {
                state.current_program = 0;
            }
        } else {
            state.raise(GlErrorCode::InvalidValue);
        }
    }
}

#[cfg(test)]
#[path = "mock_device_tests.rs"]
mod tests;
