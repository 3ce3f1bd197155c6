//! The display driver seam.
//!
//! [`DisplayBackend`] covers everything the graphics system asks of the
//! driver: surfaces, clippers, depth buffers, devices, and the handful of
//! device calls issued every frame. Resources are referred to by typed
//! [`Handle`]s and given back through [`DisplayBackend::release`].

use std::fmt::{Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

use raw_window_handle::RawWindowHandle;
use tenebra_math::matrix::Matrix4f;
use tenebra_math::vector::Vector3f;
use thiserror::Error;

use crate::material::{Color, Material};
use crate::surface::{ClipList, Rect};
use crate::texture::TextureHandle;

pub mod headless;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("the driver rejected the call: {0}")]
    Rejected(String),
    #[error("the surface memory was lost")]
    SurfaceLost,
    #[error("unknown handle {0}")]
    InvalidHandle(usize),
}

pub type Result<T> = std::result::Result<T, BackendError>;

pub struct Handle<T> {
    id: usize,
    _marker: PhantomData<T>,
}

impl<T> Handle<T> {
    #[must_use]
    pub fn new(id: usize) -> Self {
        Self {
            id,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn id(&self) -> usize {
        self.id
    }
}

impl<T> Debug for Handle<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Handle({})", self.id)
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Debug)]
pub enum DisplayContext {}
#[derive(Debug)]
pub enum Surface {}
#[derive(Debug)]
pub enum Clipper {}
#[derive(Debug)]
pub enum Interface3d {}
#[derive(Debug)]
pub enum DepthBuffer {}
#[derive(Debug)]
pub enum Device {}

/// Any acquired resource, as handed back to the backend on release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    DisplayContext(Handle<DisplayContext>),
    Surface(Handle<Surface>),
    Clipper(Handle<Clipper>),
    Interface3d(Handle<Interface3d>),
    DepthBuffer(Handle<DepthBuffer>),
    Device(Handle<Device>),
}

impl Resource {
    #[must_use]
    pub fn id(&self) -> usize {
        match self {
            Resource::DisplayContext(handle) => handle.id(),
            Resource::Surface(handle) => handle.id(),
            Resource::Clipper(handle) => handle.id(),
            Resource::Interface3d(handle) => handle.id(),
            Resource::DepthBuffer(handle) => handle.id(),
            Resource::Device(handle) => handle.id(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CooperativeLevel {
    /// Shares the display with other windows.
    Normal,
    /// Owns the display, may change its mode, and survives Ctrl+Alt+Del.
    ExclusiveFullscreen,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimarySurfaceDescriptor {
    /// Single visible surface, used in windowed mode.
    Simple,
    /// Complex flippable surface with a chain of back buffers.
    Flippable { back_buffers: u32 },
}

/// Rendering device capability tiers, most capable first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceTier {
    Hardware,
    Mmx,
    Rgb,
    Ramp,
}

impl DeviceTier {
    pub const FALLBACK_ORDER: [DeviceTier; 4] = [
        DeviceTier::Hardware,
        DeviceTier::Mmx,
        DeviceTier::Rgb,
        DeviceTier::Ramp,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthFormat {
    pub bit_depth: u32,
    pub flags: u32,
}

impl DepthFormat {
    pub const DEPTH: u32 = 0x0000_0400;
    pub const STENCIL: u32 = 0x0000_4000;

    #[must_use]
    pub const fn is_depth_only(&self) -> bool {
        self.flags == Self::DEPTH
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub min_z: f32,
    pub max_z: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderState {
    ZEnable,
    Lighting,
    AlphaBlendEnable,
    TextureMagFilter,
    TextureMinFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    World,
    View,
    Projection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    TriangleList,
    TriangleStrip,
}

/// Pre-lit vertex: position, diffuse and specular colors, one texture coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LitVertex {
    pub position: Vector3f,
    pub color: Color,
    pub specular: Color,
    pub u: f32,
    pub v: f32,
}

pub trait DisplayBackend {
    /// Size of the physical display in pixels.
    fn physical_screen_size(&self) -> (u32, u32);
    /// Bounds of `window` in screen coordinates.
    fn window_rect(&self, window: RawWindowHandle) -> Rect;

    fn create_display_context(&mut self) -> Result<Handle<DisplayContext>>;
    fn set_cooperative_level(
        &mut self,
        display: Handle<DisplayContext>,
        window: RawWindowHandle,
        level: CooperativeLevel,
    ) -> Result<()>;
    fn set_display_mode(
        &mut self,
        display: Handle<DisplayContext>,
        width: u32,
        height: u32,
        bits_per_pixel: u32,
    ) -> Result<()>;

    fn create_primary_surface(
        &mut self,
        display: Handle<DisplayContext>,
        descriptor: PrimarySurfaceDescriptor,
    ) -> Result<Handle<Surface>>;
    fn back_buffer_from_flip_chain(&mut self, primary: Handle<Surface>) -> Result<Handle<Surface>>;
    fn create_offscreen_surface(
        &mut self,
        display: Handle<DisplayContext>,
        width: u32,
        height: u32,
    ) -> Result<Handle<Surface>>;
    fn clear_surface(&mut self, surface: Handle<Surface>) -> Result<()>;

    fn create_clipper(&mut self, display: Handle<DisplayContext>) -> Result<Handle<Clipper>>;
    fn set_clip_list(&mut self, clipper: Handle<Clipper>, clip_list: &ClipList) -> Result<()>;
    fn set_clipper_window(&mut self, clipper: Handle<Clipper>, window: RawWindowHandle)
        -> Result<()>;
    fn attach_clipper(&mut self, surface: Handle<Surface>, clipper: Handle<Clipper>) -> Result<()>;

    fn create_3d_interface(&mut self, display: Handle<DisplayContext>)
        -> Result<Handle<Interface3d>>;
    fn enumerate_depth_formats(
        &mut self,
        interface: Handle<Interface3d>,
        tier: DeviceTier,
    ) -> Result<Vec<DepthFormat>>;
    fn create_depth_buffer(
        &mut self,
        display: Handle<DisplayContext>,
        width: u32,
        height: u32,
        format: DepthFormat,
    ) -> Result<Handle<DepthBuffer>>;
    fn attach_depth_buffer(
        &mut self,
        surface: Handle<Surface>,
        depth_buffer: Handle<DepthBuffer>,
    ) -> Result<()>;
    fn create_device(
        &mut self,
        interface: Handle<Interface3d>,
        tier: DeviceTier,
        render_target: Handle<Surface>,
    ) -> Result<Handle<Device>>;

    fn set_viewport(&mut self, device: Handle<Device>, viewport: &Viewport) -> Result<()>;
    fn set_render_state(
        &mut self,
        device: Handle<Device>,
        state: RenderState,
        value: u32,
    ) -> Result<()>;
    fn set_material(&mut self, device: Handle<Device>, material: &Material) -> Result<()>;
    fn set_transform(
        &mut self,
        device: Handle<Device>,
        kind: TransformKind,
        matrix: &Matrix4f,
    ) -> Result<()>;
    fn set_texture(&mut self, device: Handle<Device>, texture: Option<TextureHandle>)
        -> Result<()>;
    fn draw_primitive(
        &mut self,
        device: Handle<Device>,
        primitive: PrimitiveType,
        vertices: &[LitVertex],
    ) -> Result<()>;

    /// Copies `source_rect` of `source` into `destination_rect` of
    /// `destination`, skipping color-keyed pixels.
    fn blit(
        &mut self,
        destination: Handle<Surface>,
        destination_rect: Rect,
        source: Handle<Surface>,
        source_rect: Rect,
    ) -> Result<()>;
    fn flip(&mut self, primary: Handle<Surface>) -> Result<()>;

    fn release(&mut self, resource: Resource);
}
