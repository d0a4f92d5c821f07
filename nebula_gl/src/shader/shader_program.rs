/// ShaderProgram - compile, link and own a vertex/fragment program
///
/// Building a program goes through `compile_stage` for each stage and then
/// `link`. Stage objects only live until the link: `CompiledStage` deletes its
/// shader on drop and `link` consumes both. A failed compile or link never
/// leaves a driver object behind.

use std::fmt;
use std::path::Path;
use std::rc::Rc;

use crate::config::{CompileFailurePolicy, ValidationPolicy};
use crate::device::{GpuContext, RawHandle, ShaderStage, NULL_HANDLE};
use crate::error::{Error, ProgramPhase, Result};
use crate::gl_call;
use crate::shader::{ShaderProgramSource, ShaderSourceParser};

/// Stand-in for drivers that fail a stage without writing an info log
const EMPTY_INFO_LOG: &str = "(driver returned an empty info log)";

// ===== COMPILED STAGE =====

/// A successfully compiled shader stage, deleted on drop
pub struct CompiledStage {
    context: Rc<GpuContext>,
    handle: RawHandle,
    stage: ShaderStage,
}

impl CompiledStage {
    pub fn handle(&self) -> RawHandle {
        self.handle
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }
}

impl Drop for CompiledStage {
    fn drop(&mut self) {
        let handle = self.handle;
        if let Err(error) = gl_call!(self.context, |gl| gl.delete_shader(handle)) {
            crate::nebula_error!("nebula::Shader",
                "Failed to delete {} shader {}: {}", self.stage, handle, error);
        }
    }
}

impl fmt::Debug for CompiledStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledStage")
            .field("stage", &self.stage)
            .field("handle", &self.handle)
            .finish()
    }
}

/// Compile one stage
///
/// On compile failure the driver's info log is reported at ERROR level, the
/// stage object is deleted, and `Error::CompileFailed` carries the log.
pub fn compile_stage(context: Rc<GpuContext>, stage: ShaderStage, source: &str) -> Result<CompiledStage> {
    let handle = gl_call!(context, |gl| gl.create_shader(stage))?;
    if handle == NULL_HANDLE {
        crate::nebula_error!("nebula::Shader", "Driver returned no name for a {} shader", stage);
        return Err(Error::InvalidResource(format!("{} shader: driver returned handle 0", stage)));
    }

    let compiled = CompiledStage {
        context: Rc::clone(&context),
        handle,
        stage,
    };

    gl_call!(context, |gl| gl.shader_source(handle, source))?;
    gl_call!(context, |gl| gl.compile_shader(handle))?;
    let succeeded = gl_call!(context, |gl| gl.get_shader_compile_status(handle))?;

    if !succeeded {
        let mut log = gl_call!(context, |gl| gl.get_shader_info_log(handle))?;
        if log.trim().is_empty() {
            log = EMPTY_INFO_LOG.to_string();
        }
        crate::nebula_error!("nebula::Shader",
            "Failed to compile {} shader:\n{}", stage, log.trim_end());
        drop(compiled);
        return Err(Error::CompileFailed { stage, log });
    }

    crate::nebula_debug!("nebula::Shader", "Compiled {} shader {}", stage, handle);
    Ok(compiled)
}

/// Link the given stages into a program, then validate it
///
/// Absent stages are not attached; the driver then refuses the link. Both
/// stage objects are deleted right after the link whatever its outcome. A
/// link failure is always an error. A validation failure is handled per
/// `Config::validation_policy`.
pub fn link(
    context: Rc<GpuContext>,
    vertex: Option<CompiledStage>,
    fragment: Option<CompiledStage>,
) -> Result<ShaderProgram> {
    let handle = gl_call!(context, |gl| gl.create_program())?;
    if handle == NULL_HANDLE {
        crate::nebula_error!("nebula::Shader", "Driver returned no name for a program");
        return Err(Error::InvalidResource("program: driver returned handle 0".to_string()));
    }

    let mut program = ShaderProgram {
        context: Rc::clone(&context),
        handle,
        validated: false,
    };

    for stage in vertex.iter().chain(fragment.iter()) {
        let shader = stage.handle();
        gl_call!(context, |gl| gl.attach_shader(handle, shader))?;
    }

    let linked = gl_call!(context, |gl| gl.link_program(handle));
    drop(vertex);
    drop(fragment);
    linked?;

    if !gl_call!(context, |gl| gl.get_program_link_status(handle))? {
        let log = program_info_log(&context, handle)?;
        crate::nebula_error!("nebula::Shader", "Failed to link program {}:\n{}", handle, log.trim_end());
        return Err(Error::LinkOrValidateFailed { phase: ProgramPhase::Link, log });
    }

    gl_call!(context, |gl| gl.validate_program(handle))?;
    program.validated = gl_call!(context, |gl| gl.get_program_validate_status(handle))?;

    if !program.validated {
        let log = program_info_log(&context, handle)?;
        match context.config().validation_policy {
            ValidationPolicy::LogOnly => {
                crate::nebula_warn!("nebula::Shader",
                    "Program {} failed validation (kept):\n{}", handle, log.trim_end());
            }
            ValidationPolicy::Fatal => {
                crate::nebula_error!("nebula::Shader",
                    "Program {} failed validation:\n{}", handle, log.trim_end());
                return Err(Error::LinkOrValidateFailed { phase: ProgramPhase::Validate, log });
            }
        }
    }

    crate::nebula_info!("nebula::Shader", "Linked program {} (validated: {})", handle, program.validated);
    Ok(program)
}

fn program_info_log(context: &GpuContext, handle: RawHandle) -> Result<String> {
    let log = gl_call!(context, |gl| gl.get_program_info_log(handle))?;
    if log.trim().is_empty() {
        Ok(EMPTY_INFO_LOG.to_string())
    } else {
        Ok(log)
    }
}

// ===== BUILDER =====

/// Progress of a program build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    NotStarted,
    VertexCompiled,
    FragmentCompiled,
    /// Linked, but the driver reported validation failure
    Linked,
    Validated,
    /// A stage failed to compile (the first failing stage)
    Failed(ShaderStage),
    /// Link or validation was refused
    ProgramFailed(ProgramPhase),
}

/// Drives compile → link → validate for one program at a time
///
/// # Example
///
/// ```no_run
/// use std::rc::Rc;
/// use nebula_gl::nebula::Config;
/// use nebula_gl::nebula::device::{GpuContext, MockDevice};
/// use nebula_gl::nebula::shader::{ShaderProgramBuilder, ShaderProgramSource};
///
/// let context = GpuContext::new(Rc::new(MockDevice::new()), Config::default());
/// let source = ShaderProgramSource::from_file("res/shaders/basic.shader")?;
/// let mut builder = ShaderProgramBuilder::new(context);
/// let program = builder.build(&source)?;
/// program.bind()?;
/// # Ok::<(), nebula_gl::nebula::Error>(())
/// ```
#[derive(Debug)]
pub struct ShaderProgramBuilder {
    context: Rc<GpuContext>,
    state: BuildState,
}

impl ShaderProgramBuilder {
    pub fn new(context: Rc<GpuContext>) -> Self {
        Self {
            context,
            state: BuildState::NotStarted,
        }
    }

    /// State reached by the last build
    pub fn state(&self) -> BuildState {
        self.state
    }

    /// Compile both stages and link them
    ///
    /// With `CompileFailurePolicy::ShortCircuit` the first compile failure is
    /// returned at once. With `Lenient` both stages are compiled and a link is
    /// attempted with whatever compiled; the first compile failure is still
    /// returned and any program produced is discarded.
    pub fn build(&mut self, source: &ShaderProgramSource) -> Result<ShaderProgram> {
        self.state = BuildState::NotStarted;
        let mut first_failure = None;

        let vertex = self.compile(ShaderStage::Vertex, &source.vertex, &mut first_failure)?;
        let fragment = self.compile(ShaderStage::Fragment, &source.fragment, &mut first_failure)?;

        let linked = link(Rc::clone(&self.context), vertex, fragment);

        if let Some(error) = first_failure {
            if let Ok(program) = linked {
                program.destroy()?;
            }
            crate::nebula_warn!("nebula::Shader", "Lenient build attempted a link after a compile failure");
            return Err(error);
        }

        match linked {
            Ok(program) => {
                self.state = if program.is_validated() {
                    BuildState::Validated
                } else {
                    BuildState::Linked
                };
                Ok(program)
            }
            Err(error) => {
                let phase = match &error {
                    Error::LinkOrValidateFailed { phase, .. } => *phase,
                    _ => ProgramPhase::Link,
                };
                self.state = BuildState::ProgramFailed(phase);
                Err(error)
            }
        }
    }

    fn compile(
        &mut self,
        stage: ShaderStage,
        source: &str,
        first_failure: &mut Option<Error>,
    ) -> Result<Option<CompiledStage>> {
        let lenient = self.context.config().compile_failure_policy == CompileFailurePolicy::Lenient;

        match compile_stage(Rc::clone(&self.context), stage, source) {
            Ok(compiled) => {
                if first_failure.is_none() {
                    self.state = match stage {
                        ShaderStage::Vertex => BuildState::VertexCompiled,
                        ShaderStage::Fragment => BuildState::FragmentCompiled,
                    };
                }
                Ok(Some(compiled))
            }
            Err(error @ Error::CompileFailed { .. }) if lenient => {
                if first_failure.is_none() {
                    self.state = BuildState::Failed(stage);
                    *first_failure = Some(error);
                }
                Ok(None)
            }
            Err(error) => {
                self.state = BuildState::Failed(stage);
                Err(error)
            }
        }
    }
}

// ===== SHADER PROGRAM =====

/// Location of an active uniform in a linked program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformLocation(i32);

impl UniformLocation {
    pub fn raw(&self) -> i32 {
        self.0
    }
}

/// Linked program that owns its driver handle
pub struct ShaderProgram {
    context: Rc<GpuContext>,
    handle: RawHandle,
    validated: bool,
}

impl ShaderProgram {
    /// Build a program from already split source
    pub fn from_source(context: Rc<GpuContext>, source: &ShaderProgramSource) -> Result<Self> {
        ShaderProgramBuilder::new(context).build(source)
    }

    /// Read a combined source file (split on the configured marker) and build it
    pub fn from_file(context: Rc<GpuContext>, path: impl AsRef<Path>) -> Result<Self> {
        let parser = ShaderSourceParser::new(context.config().marker_token.clone());
        let source = parser.parse_file(path)?;
        Self::from_source(context, &source)
    }

    pub fn handle(&self) -> RawHandle {
        self.handle
    }

    /// Whether glValidateProgram accepted the program
    pub fn is_validated(&self) -> bool {
        self.validated
    }

    pub fn bind(&self) -> Result<()> {
        let handle = self.handle;
        gl_call!(self.context, |gl| gl.use_program(handle))
    }

    /// Make no program current
    pub fn unbind(&self) -> Result<()> {
        gl_call!(self.context, |gl| gl.use_program(NULL_HANDLE))
    }

    /// Look up an active uniform; unknown or optimised-out names are an error
    pub fn uniform_location(&self, name: &str) -> Result<UniformLocation> {
        let handle = self.handle;
        let location = gl_call!(self.context, |gl| gl.get_uniform_location(handle, name))?;
        if location == -1 {
            crate::nebula_error!("nebula::Shader", "Program {} has no active uniform '{}'", handle, name);
            return Err(Error::UnknownUniform(name.to_string()));
        }
        Ok(UniformLocation(location))
    }

    /// Set a vec4 uniform; the program must be bound
    pub fn set_uniform_4f(&self, location: UniformLocation, value: [f32; 4]) -> Result<()> {
        let raw = location.raw();
        gl_call!(self.context, |gl| gl.uniform_4f(raw, value))
    }

    /// Delete the program now, reporting driver errors
    pub fn destroy(mut self) -> Result<()> {
        self.release()
    }

    fn release(&mut self) -> Result<()> {
        if self.handle == NULL_HANDLE {
            return Ok(());
        }
        let handle = std::mem::replace(&mut self.handle, NULL_HANDLE);
        gl_call!(self.context, |gl| gl.delete_program(handle))?;
        crate::nebula_debug!("nebula::Shader", "Deleted program {}", handle);
        Ok(())
    }
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        let handle = self.handle;
        if let Err(error) = self.release() {
            crate::nebula_error!("nebula::Shader", "Failed to delete program {}: {}", handle, error);
        }
    }
}

impl fmt::Debug for ShaderProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("handle", &self.handle)
            .field("validated", &self.validated)
            .finish()
    }
}

#[cfg(test)]
#[path = "shader_program_tests.rs"]
mod tests;
