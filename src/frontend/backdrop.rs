//! Full-viewport WebGL2 backdrop: a lit model rendered offscreen, then warped
//! by a pointer-driven distortion pass.

use glam::{Mat4, Vec2, Vec3};
use gloo_net::http::Request;
use js_sys::Float32Array;
use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};
use thiserror::Error;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
    window, Event, HtmlCanvasElement, MouseEvent, WebGl2RenderingContext as GL, WebGlBuffer,
    WebGlFramebuffer, WebGlProgram, WebGlRenderbuffer, WebGlShader, WebGlTexture,
    WebGlUniformLocation, WebGlVertexArrayObject,
};
use yew::prelude::*;

use super::dom::{
    prefers_reduced_motion, scroll_metrics, viewport_size, warn, EventListener, FrameLoop,
};
use crate::content::MODEL_PATH;
use crate::mesh::{parse_obj, Mesh, ObjError};
use crate::motion::{ease_parallax, parallax_offset, SplatTrail, SPLAT_CAPACITY};

const MAX_PIXEL_RATIO: f64 = 2.0;
const FIELD_OF_VIEW_DEGREES: f32 = 35.0;
const CAMERA_DISTANCE: f32 = 4.2;
const MODEL_OFFSET_X: f32 = 1.1;
const SPIN_RATE: f32 = 0.25;
const TILT_RATE: f32 = 0.13;

const SCENE_VERTEX_SHADER: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;

uniform mat4 u_model;
uniform mat4 u_view_projection;

out vec3 v_normal;

void main() {
    v_normal = mat3(u_model) * a_normal;
    gl_Position = u_view_projection * u_model * vec4(a_position, 1.0);
}
"#;

const SCENE_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

in vec3 v_normal;
out vec4 out_color;

const vec3 LIGHT_DIRECTION = normalize(vec3(0.4, 0.8, 0.6));
const vec3 BASE_COLOR = vec3(0.42, 0.48, 0.98);
const vec3 RIM_COLOR = vec3(0.95, 0.45, 0.85);

void main() {
    vec3 normal = normalize(v_normal);
    float diffuse = max(dot(normal, LIGHT_DIRECTION), 0.0);
    float rim = pow(1.0 - max(normal.z, 0.0), 3.0);
    vec3 color = BASE_COLOR * (0.18 + 0.82 * diffuse) + RIM_COLOR * rim * 0.6;
    out_color = vec4(color, 1.0);
}
"#;

const POST_VERTEX_SHADER: &str = r#"#version 300 es
out vec2 v_uv;

void main() {
    vec2 corner = vec2(float((gl_VertexID << 1) & 2), float(gl_VertexID & 2));
    v_uv = corner;
    gl_Position = vec4(corner * 2.0 - 1.0, 0.0, 1.0);
}
"#;

const POST_FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

#define MAX_SPLATS 16

uniform sampler2D u_scene;
uniform vec2 u_resolution;
uniform float u_time;
uniform int u_splat_count;
uniform vec4 u_splats[MAX_SPLATS];
uniform float u_strengths[MAX_SPLATS];

in vec2 v_uv;
out vec4 out_color;

void main() {
    vec2 aspect = vec2(u_resolution.x / max(u_resolution.y, 1.0), 1.0);
    vec2 offset = vec2(0.0);
    float energy = 0.0;

    for (int i = 0; i < MAX_SPLATS; i++) {
        if (i >= u_splat_count) {
            break;
        }
        vec2 delta = (v_uv - u_splats[i].xy) * aspect;
        float weight = exp(-dot(delta, delta) * 160.0) * u_strengths[i];
        offset -= u_splats[i].zw * weight;
        energy += weight;
    }

    vec2 swirl = vec2(
        sin(v_uv.y * 9.0 + u_time * 0.6),
        cos(v_uv.x * 7.0 - u_time * 0.5)
    ) * 0.0035;

    vec3 scene = texture(u_scene, v_uv + offset + swirl).rgb;
    vec3 tint = vec3(0.35, 0.45, 0.95) * min(energy, 1.0) * 0.22;
    out_color = vec4(scene + tint, 1.0);
}
"#;

#[derive(Debug, Error)]
pub enum BackdropError {
    #[error("WebGL2 is not available")]
    Unsupported,
    #[error("could not allocate {0}")]
    Allocation(&'static str),
    #[error("{stage} shader failed to compile: {log}")]
    Shader { stage: &'static str, log: String },
    #[error("program failed to link: {0}")]
    Link(String),
    #[error("offscreen framebuffer is incomplete")]
    Framebuffer,
    #[error("model request failed: {0}")]
    ModelFetch(String),
    #[error(transparent)]
    Model(#[from] ObjError),
}

struct SceneUniforms {
    model: Option<WebGlUniformLocation>,
    view_projection: Option<WebGlUniformLocation>,
}

struct PostUniforms {
    scene: Option<WebGlUniformLocation>,
    resolution: Option<WebGlUniformLocation>,
    time: Option<WebGlUniformLocation>,
    splat_count: Option<WebGlUniformLocation>,
    splats: Option<WebGlUniformLocation>,
    strengths: Option<WebGlUniformLocation>,
}

struct RenderTarget {
    framebuffer: WebGlFramebuffer,
    texture: WebGlTexture,
    depth: WebGlRenderbuffer,
    width: i32,
    height: i32,
}

impl RenderTarget {
    fn new(gl: &GL) -> Result<Self, BackdropError> {
        let framebuffer = gl
            .create_framebuffer()
            .ok_or(BackdropError::Allocation("framebuffer"))?;
        let texture = gl.create_texture().ok_or(BackdropError::Allocation("texture"))?;
        let depth = gl
            .create_renderbuffer()
            .ok_or(BackdropError::Allocation("renderbuffer"))?;

        gl.bind_texture(GL::TEXTURE_2D, Some(&texture));
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MIN_FILTER, GL::LINEAR as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_MAG_FILTER, GL::LINEAR as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_S, GL::CLAMP_TO_EDGE as i32);
        gl.tex_parameteri(GL::TEXTURE_2D, GL::TEXTURE_WRAP_T, GL::CLAMP_TO_EDGE as i32);

        let mut target = Self {
            framebuffer,
            texture,
            depth,
            width: 0,
            height: 0,
        };
        target.resize(gl, 1, 1);

        gl.bind_framebuffer(GL::FRAMEBUFFER, Some(&target.framebuffer));
        gl.framebuffer_texture_2d(
            GL::FRAMEBUFFER,
            GL::COLOR_ATTACHMENT0,
            GL::TEXTURE_2D,
            Some(&target.texture),
            0,
        );
        gl.framebuffer_renderbuffer(
            GL::FRAMEBUFFER,
            GL::DEPTH_ATTACHMENT,
            GL::RENDERBUFFER,
            Some(&target.depth),
        );
        let complete = gl.check_framebuffer_status(GL::FRAMEBUFFER) == GL::FRAMEBUFFER_COMPLETE;
        gl.bind_framebuffer(GL::FRAMEBUFFER, None);

        if complete {
            Ok(target)
        } else {
            Err(BackdropError::Framebuffer)
        }
    }

    fn resize(&mut self, gl: &GL, width: i32, height: i32) {
        if self.width == width && self.height == height {
            return;
        }

        gl.bind_texture(GL::TEXTURE_2D, Some(&self.texture));
        let _ = gl.tex_image_2d_with_i32_and_i32_and_i32_and_format_and_type_and_opt_u8_array(
            GL::TEXTURE_2D,
            0,
            GL::RGBA8 as i32,
            width,
            height,
            0,
            GL::RGBA,
            GL::UNSIGNED_BYTE,
            None,
        );
        gl.bind_renderbuffer(GL::RENDERBUFFER, Some(&self.depth));
        gl.renderbuffer_storage(GL::RENDERBUFFER, GL::DEPTH_COMPONENT16, width, height);
        gl.bind_renderbuffer(GL::RENDERBUFFER, None);

        self.width = width;
        self.height = height;
    }
}

struct Renderer {
    gl: GL,
    scene_program: WebGlProgram,
    post_program: WebGlProgram,
    scene_uniforms: SceneUniforms,
    post_uniforms: PostUniforms,
    mesh_vao: WebGlVertexArrayObject,
    mesh_buffer: WebGlBuffer,
    screen_vao: WebGlVertexArrayObject,
    vertex_count: i32,
    target: RenderTarget,
    trail: SplatTrail,
    splat_data: [f32; SPLAT_CAPACITY * 4],
    strength_data: [f32; SPLAT_CAPACITY],
    parallax: f32,
    parallax_target: f32,
    model_y: f32,
    animate: bool,
    started_at: Option<f64>,
    last_frame: Option<f64>,
}

impl Renderer {
    fn new(canvas: &HtmlCanvasElement, animate: bool) -> Result<Self, BackdropError> {
        let gl = canvas
            .get_context("webgl2")
            .ok()
            .flatten()
            .and_then(|context| context.dyn_into::<GL>().ok())
            .ok_or(BackdropError::Unsupported)?;

        let scene_program = link_program(&gl, SCENE_VERTEX_SHADER, SCENE_FRAGMENT_SHADER)?;
        let post_program = link_program(&gl, POST_VERTEX_SHADER, POST_FRAGMENT_SHADER)?;

        let scene_uniforms = SceneUniforms {
            model: gl.get_uniform_location(&scene_program, "u_model"),
            view_projection: gl.get_uniform_location(&scene_program, "u_view_projection"),
        };
        let post_uniforms = PostUniforms {
            scene: gl.get_uniform_location(&post_program, "u_scene"),
            resolution: gl.get_uniform_location(&post_program, "u_resolution"),
            time: gl.get_uniform_location(&post_program, "u_time"),
            splat_count: gl.get_uniform_location(&post_program, "u_splat_count"),
            splats: gl.get_uniform_location(&post_program, "u_splats"),
            strengths: gl.get_uniform_location(&post_program, "u_strengths"),
        };

        let mesh_vao = gl
            .create_vertex_array()
            .ok_or(BackdropError::Allocation("vertex array"))?;
        let mesh_buffer = gl
            .create_buffer()
            .ok_or(BackdropError::Allocation("vertex buffer"))?;
        let stride = (6 * std::mem::size_of::<f32>()) as i32;

        gl.bind_vertex_array(Some(&mesh_vao));
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&mesh_buffer));
        gl.vertex_attrib_pointer_with_i32(0, 3, GL::FLOAT, false, stride, 0);
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_with_i32(1, 3, GL::FLOAT, false, stride, stride / 2);
        gl.enable_vertex_attrib_array(1);
        gl.bind_vertex_array(None);

        // The post pass generates its triangle from gl_VertexID.
        let screen_vao = gl
            .create_vertex_array()
            .ok_or(BackdropError::Allocation("vertex array"))?;

        let target = RenderTarget::new(&gl)?;

        Ok(Self {
            gl,
            scene_program,
            post_program,
            scene_uniforms,
            post_uniforms,
            mesh_vao,
            mesh_buffer,
            screen_vao,
            vertex_count: 0,
            target,
            trail: SplatTrail::default(),
            splat_data: [0.0; SPLAT_CAPACITY * 4],
            strength_data: [0.0; SPLAT_CAPACITY],
            parallax: 0.0,
            parallax_target: 0.0,
            model_y: 0.0,
            animate,
            started_at: None,
            last_frame: None,
        })
    }

    fn upload_mesh(&mut self, mesh: &Mesh) {
        let interleaved = Float32Array::from(mesh.interleaved().as_slice());
        self.gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.mesh_buffer));
        self.gl.buffer_data_with_array_buffer_view(
            GL::ARRAY_BUFFER,
            &interleaved,
            GL::STATIC_DRAW,
        );
        self.gl.bind_buffer(GL::ARRAY_BUFFER, None);
        self.vertex_count = i32::try_from(mesh.vertex_count()).unwrap_or(0);
    }

    fn render(&mut self, timestamp: f64, width: i32, height: i32) {
        let started_at = *self.started_at.get_or_insert(timestamp);
        let dt = self.last_frame.map_or(0.0, |last| ((timestamp - last) / 1000.0) as f32);
        self.last_frame = Some(timestamp);
        let time = if self.animate {
            ((timestamp - started_at) / 1000.0) as f32
        } else {
            0.0
        };

        if self.animate {
            let (eased, placed) = ease_parallax(self.parallax, self.parallax_target, time);
            self.parallax = eased;
            self.model_y = placed;
        } else {
            self.parallax = self.parallax_target;
            self.model_y = self.parallax_target;
        }

        self.trail.decay(dt);
        self.target.resize(&self.gl, width, height);
        self.draw_scene(time, width, height);
        self.draw_post(time, width, height);
    }

    fn draw_scene(&self, time: f32, width: i32, height: i32) {
        let gl = &self.gl;
        gl.bind_framebuffer(GL::FRAMEBUFFER, Some(&self.target.framebuffer));
        gl.viewport(0, 0, width, height);
        gl.clear_color(0.02, 0.025, 0.05, 1.0);
        gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);

        if self.vertex_count > 0 {
            let aspect = width as f32 / height.max(1) as f32;
            let projection =
                Mat4::perspective_rh_gl(FIELD_OF_VIEW_DEGREES.to_radians(), aspect, 0.1, 50.0);
            let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, CAMERA_DISTANCE), Vec3::ZERO, Vec3::Y);
            let model = Mat4::from_translation(Vec3::new(MODEL_OFFSET_X, self.model_y, 0.0))
                * Mat4::from_rotation_y(time * SPIN_RATE)
                * Mat4::from_rotation_x(time * TILT_RATE);

            gl.enable(GL::DEPTH_TEST);
            gl.use_program(Some(&self.scene_program));
            gl.uniform_matrix4fv_with_f32_array(
                self.scene_uniforms.model.as_ref(),
                false,
                &model.to_cols_array(),
            );
            gl.uniform_matrix4fv_with_f32_array(
                self.scene_uniforms.view_projection.as_ref(),
                false,
                &(projection * view).to_cols_array(),
            );
            gl.bind_vertex_array(Some(&self.mesh_vao));
            gl.draw_arrays(GL::TRIANGLES, 0, self.vertex_count);
            gl.bind_vertex_array(None);
            gl.disable(GL::DEPTH_TEST);
        }

        gl.bind_framebuffer(GL::FRAMEBUFFER, None);
    }

    fn draw_post(&mut self, time: f32, width: i32, height: i32) {
        let count = self
            .trail
            .write_uniforms(&mut self.splat_data, &mut self.strength_data);

        let gl = &self.gl;
        let uniforms = &self.post_uniforms;
        gl.viewport(0, 0, width, height);
        gl.use_program(Some(&self.post_program));
        gl.active_texture(GL::TEXTURE0);
        gl.bind_texture(GL::TEXTURE_2D, Some(&self.target.texture));
        gl.uniform1i(uniforms.scene.as_ref(), 0);
        gl.uniform2f(uniforms.resolution.as_ref(), width as f32, height as f32);
        gl.uniform1f(uniforms.time.as_ref(), time);
        gl.uniform1i(uniforms.splat_count.as_ref(), count as i32);
        gl.uniform4fv_with_f32_array(uniforms.splats.as_ref(), &self.splat_data);
        gl.uniform1fv_with_f32_array(uniforms.strengths.as_ref(), &self.strength_data);
        gl.bind_vertex_array(Some(&self.screen_vao));
        gl.draw_arrays(GL::TRIANGLES, 0, 3);
        gl.bind_vertex_array(None);
    }
}

impl Drop for Renderer {
    fn drop(&mut self) {
        let gl = &self.gl;
        gl.delete_program(Some(&self.scene_program));
        gl.delete_program(Some(&self.post_program));
        gl.delete_buffer(Some(&self.mesh_buffer));
        gl.delete_vertex_array(Some(&self.mesh_vao));
        gl.delete_vertex_array(Some(&self.screen_vao));
        gl.delete_framebuffer(Some(&self.target.framebuffer));
        gl.delete_texture(Some(&self.target.texture));
        gl.delete_renderbuffer(Some(&self.target.depth));
    }
}

fn compile_shader(
    gl: &GL,
    kind: u32,
    stage: &'static str,
    source: &str,
) -> Result<WebGlShader, BackdropError> {
    let shader = gl
        .create_shader(kind)
        .ok_or(BackdropError::Allocation("shader"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    let compiled = gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if compiled {
        return Ok(shader);
    }

    let log = gl.get_shader_info_log(&shader).unwrap_or_default();
    gl.delete_shader(Some(&shader));
    Err(BackdropError::Shader { stage, log })
}

fn link_program(gl: &GL, vertex_source: &str, fragment_source: &str) -> Result<WebGlProgram, BackdropError> {
    let vertex = compile_shader(gl, GL::VERTEX_SHADER, "vertex", vertex_source)?;
    let fragment = compile_shader(gl, GL::FRAGMENT_SHADER, "fragment", fragment_source)?;
    let program = gl
        .create_program()
        .ok_or(BackdropError::Allocation("program"))?;

    gl.attach_shader(&program, &vertex);
    gl.attach_shader(&program, &fragment);
    gl.link_program(&program);

    let linked = gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);

    gl.detach_shader(&program, &vertex);
    gl.detach_shader(&program, &fragment);
    gl.delete_shader(Some(&vertex));
    gl.delete_shader(Some(&fragment));

    if linked {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(BackdropError::Link(log))
    }
}

async fn fetch_model(path: &str) -> Result<Mesh, BackdropError> {
    let response = Request::get(path)
        .send()
        .await
        .map_err(|error| BackdropError::ModelFetch(error.to_string()))?;

    if !response.ok() {
        return Err(BackdropError::ModelFetch(format!("status {}", response.status())));
    }

    let source = response
        .text()
        .await
        .map_err(|error| BackdropError::ModelFetch(error.to_string()))?;

    Ok(parse_obj(&source)?)
}

fn load_model(renderer: Weak<RefCell<Renderer>>) {
    spawn_local(async move {
        match fetch_model(MODEL_PATH).await {
            Ok(mesh) => {
                if let Some(renderer) = renderer.upgrade() {
                    renderer.borrow_mut().upload_mesh(&mesh);
                }
            }
            Err(error) => warn(&format!("backdrop model unavailable: {error}")),
        }
    });
}

/// Matches the drawing buffer to the canvas' CSS size.
fn fit_canvas(canvas: &HtmlCanvasElement) -> (i32, i32) {
    let ratio = window()
        .map(|win| win.device_pixel_ratio())
        .unwrap_or(1.0)
        .clamp(1.0, MAX_PIXEL_RATIO);
    let width = ((f64::from(canvas.client_width()) * ratio).round() as u32).max(1);
    let height = ((f64::from(canvas.client_height()) * ratio).round() as u32).max(1);

    if canvas.width() != width {
        canvas.set_width(width);
    }
    if canvas.height() != height {
        canvas.set_height(height);
    }

    (width as i32, height as i32)
}

struct BackdropHandle {
    _frames: FrameLoop,
    _listeners: Vec<EventListener>,
}

fn start(canvas: HtmlCanvasElement) -> Result<BackdropHandle, BackdropError> {
    let animate = !prefers_reduced_motion();
    let renderer = Rc::new(RefCell::new(Renderer::new(&canvas, animate)?));
    let win = window().ok_or(BackdropError::Unsupported)?;

    load_model(Rc::downgrade(&renderer));

    let sync_parallax = {
        let renderer = renderer.clone();
        move || {
            renderer.borrow_mut().parallax_target = parallax_offset(scroll_metrics());
        }
    };
    sync_parallax();

    let mut listeners = vec![EventListener::new(&win, "scroll", {
        let sync_parallax = sync_parallax.clone();
        move |_| sync_parallax()
    })];
    listeners.push(EventListener::new(&win, "resize", move |_| sync_parallax()));

    if animate {
        let renderer = renderer.clone();
        listeners.push(EventListener::new(&win, "mousemove", move |event: Event| {
            let Some(mouse) = event.dyn_ref::<MouseEvent>() else {
                return;
            };
            let (width, height) = viewport_size();
            if width <= 0.0 || height <= 0.0 {
                return;
            }
            let uv = Vec2::new(
                (f64::from(mouse.client_x()) / width) as f32,
                1.0 - (f64::from(mouse.client_y()) / height) as f32,
            );
            renderer.borrow_mut().trail.push_pointer(uv);
        }));
    }

    let frames = FrameLoop::start(move |timestamp| {
        let (width, height) = fit_canvas(&canvas);
        renderer.borrow_mut().render(timestamp, width, height);
        true
    });

    Ok(BackdropHandle {
        _frames: frames,
        _listeners: listeners,
    })
}

#[function_component(FluidBackdrop)]
pub fn fluid_backdrop() -> Html {
    let canvas = use_node_ref();
    let failed = use_state_eq(|| false);

    {
        let canvas = canvas.clone();
        let failed = failed.clone();
        use_effect_with((), move |_| {
            let handle = canvas
                .cast::<HtmlCanvasElement>()
                .ok_or(BackdropError::Unsupported)
                .and_then(start);

            let handle = match handle {
                Ok(handle) => Some(handle),
                Err(error) => {
                    warn(&format!("backdrop disabled: {error}"));
                    failed.set(true);
                    None
                }
            };

            move || drop(handle)
        });
    }

    html! {
        <canvas
            ref={canvas}
            class={classes!("fluid-backdrop", (*failed).then_some("is-hidden"))}
            aria-hidden="true"
        />
    }
}
