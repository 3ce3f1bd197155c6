#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use log::{debug, info, trace, warn};
use raw_window_handle::RawWindowHandle;
use tenebra_math::matrix::{Identity, Matrix4f};
use tenebra_math::vector::{Vector2i, Vector3f};
use thiserror::Error;

use backend::{
    BackendError, Clipper, CooperativeLevel, DepthBuffer, DepthFormat, Device, DeviceTier,
    DisplayBackend, DisplayContext, Handle, Interface3d, LitVertex, PrimarySurfaceDescriptor,
    PrimitiveType, RenderState, Resource, Surface, TransformKind, Viewport,
};
use config::{ConfigError, GraphicsConfig};
use cursor::{CursorAnimation, CURSOR_SHEET_HEIGHT, CURSOR_SHEET_WIDTH, NUM_CIRCLE_FRAMES};
use material::{Color, Material, MaterialPreset, Materials};
use surface::{ClipList, Rect};
use texture::{TextureHandle, TextureSource};
use view::ViewState;

pub mod backend;
pub mod config;
pub mod cursor;
pub mod material;
pub mod surface;
pub mod texture;
pub mod view;

/// Rows below the 3D viewport left to the interface panel.
pub const VIEWPORT_BOTTOM_MARGIN: u32 = 100;

const PREFERRED_BITS_PER_PIXEL: u32 = 16;
const FALLBACK_BITS_PER_PIXEL: u32 = 24;
const CIRCLE_TEXTURES: [&str; NUM_CIRCLE_FRAMES] = ["circle1", "circle2", "circle3"];

#[derive(Debug, Error)]
pub enum GraphicsError {
    #[error("the graphics system is already initialized")]
    AlreadyInitialized,
    #[error("the graphics system is not initialized")]
    NotInitialized,
    #[error("invalid graphics configuration")]
    Config(#[from] ConfigError),
    #[error("couldn't acquire the display context")]
    DisplayContext(#[source] BackendError),
    #[error("couldn't set the cooperative level")]
    CooperativeLevel(#[source] BackendError),
    #[error("couldn't set a {width}x{height} display mode at 16 or 24 bpp")]
    DisplayMode {
        width: u32,
        height: u32,
        #[source]
        source: BackendError,
    },
    #[error("couldn't create the primary surface")]
    PrimarySurface(#[source] BackendError),
    #[error("couldn't obtain the back buffer")]
    BackBuffer(#[source] BackendError),
    #[error("couldn't clear a surface")]
    ClearSurface(#[source] BackendError),
    #[error("couldn't set up the back buffer clipper")]
    Clipper(#[source] BackendError),
    #[error("couldn't set up the window clipper")]
    WindowClipper(#[source] BackendError),
    #[error("couldn't obtain the 3D interface")]
    Interface3d(#[source] BackendError),
    #[error("no depth-only buffer format is available")]
    NoDepthFormat,
    #[error("couldn't set up the depth buffer")]
    DepthBuffer(#[source] BackendError),
    #[error("couldn't create a device on any tier")]
    Device(#[source] BackendError),
    #[error("couldn't configure the viewport")]
    Viewport(#[source] BackendError),
    #[error("couldn't set a render state")]
    RenderState(#[source] BackendError),
    #[error("couldn't set the material")]
    Material(#[source] BackendError),
    #[error("couldn't set a transform")]
    Transform(#[source] BackendError),
    #[error("couldn't bind the texture")]
    Texture(#[source] BackendError),
    #[error("texture {0} not found")]
    TextureNotFound(String),
    #[error("overlay circle textures are not set up")]
    CirclesNotSetUp,
    #[error("couldn't create the cursor sheet")]
    CursorSheet(#[source] BackendError),
    #[error("no cursor sheet is loaded")]
    NoCursorSheet,
    #[error("couldn't draw")]
    Draw(#[source] BackendError),
    #[error("couldn't present the back buffer")]
    Present(#[source] BackendError),
}

pub type Result<T> = std::result::Result<T, GraphicsError>;

/// Progress of [`GraphicsSystem::initialize`], in acquisition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Uninitialized,
    WindowCreated,
    DisplayContextAcquired,
    CooperativeLevelSet,
    DisplayModeSet,
    PrimarySurfaceCreated,
    BackBufferBound,
    DepthBufferAttached,
    DeviceCreated,
    ViewportConfigured,
    MaterialsInitialized,
    Ready,
}

/// Which geometry gets texture filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterState {
    #[default]
    None,
    Terrain,
    Both,
}

/// Owns the display driver resources and the per-frame rendering state.
///
/// Resources are acquired by [`GraphicsSystem::initialize`] and released in
/// reverse acquisition order by [`GraphicsSystem::shutdown`], which also runs
/// on drop.
pub struct GraphicsSystem<B>
where
    B: DisplayBackend,
{
    backend: B,
    state: LifecycleState,
    config: GraphicsConfig,
    window: Option<RawWindowHandle>,

    display: Option<Handle<DisplayContext>>,
    primary: Option<Handle<Surface>>,
    back_buffer: Option<Handle<Surface>>,
    clipper: Option<Handle<Clipper>>,
    window_clipper: Option<Handle<Clipper>>,
    interface: Option<Handle<Interface3d>>,
    depth_buffer: Option<Handle<DepthBuffer>>,
    device: Option<Handle<Device>>,
    cursor_sheet: Option<Handle<Surface>>,

    device_tier: Option<DeviceTier>,
    back_buffer_size: (u32, u32),
    viewport: Option<Viewport>,
    view: ViewState,
    view_matrix: Matrix4f,
    materials: Materials,
    current_texture: Option<TextureHandle>,
    circles: Option<[TextureHandle; NUM_CIRCLE_FRAMES]>,
    cursor: CursorAnimation,
    filter: FilterState,
}

impl<B> GraphicsSystem<B>
where
    B: DisplayBackend,
{
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            state: LifecycleState::Uninitialized,
            config: GraphicsConfig::default(),
            window: None,
            display: None,
            primary: None,
            back_buffer: None,
            clipper: None,
            window_clipper: None,
            interface: None,
            depth_buffer: None,
            device: None,
            cursor_sheet: None,
            device_tier: None,
            back_buffer_size: (0, 0),
            viewport: None,
            view: ViewState::new(),
            view_matrix: Matrix4f::identity(),
            materials: Materials::new(),
            current_texture: None,
            circles: None,
            cursor: CursorAnimation::default(),
            filter: FilterState::None,
        }
    }

    /// Brings the display up in the mode `config` asks for.
    ///
    /// # Errors
    ///
    /// Returns an error if the system is already initialized, if `config` is
    /// invalid, or naming the first step the driver refused. On failure every
    /// resource acquired so far is released and the system is back to
    /// [`LifecycleState::Uninitialized`].
    pub fn initialize(&mut self, window: RawWindowHandle, config: GraphicsConfig) -> Result<()> {
        if self.state != LifecycleState::Uninitialized {
            return Err(GraphicsError::AlreadyInitialized);
        }
        config.validate()?;

        self.cursor = CursorAnimation::new(&config.cursors);
        self.config = config;
        self.window = Some(window);
        self.transition(LifecycleState::WindowCreated);

        if let Err(error) = self.acquire_resources(window) {
            warn!(
                "Graphics initialization failed after {:?}: {error}",
                self.state
            );
            self.shutdown();
            return Err(error);
        }

        self.transition(LifecycleState::Ready);
        Ok(())
    }

    fn transition(&mut self, state: LifecycleState) {
        debug!("Graphics state {:?} -> {state:?}", self.state);
        self.state = state;
    }

    fn acquire_resources(&mut self, window: RawWindowHandle) -> Result<()> {
        let windowed = self.config.screen.windowed;

        let display = self
            .backend
            .create_display_context()
            .map_err(GraphicsError::DisplayContext)?;
        self.display = Some(display);
        self.transition(LifecycleState::DisplayContextAcquired);

        let level = if windowed {
            CooperativeLevel::Normal
        } else {
            CooperativeLevel::ExclusiveFullscreen
        };
        self.backend
            .set_cooperative_level(display, window, level)
            .map_err(GraphicsError::CooperativeLevel)?;
        self.transition(LifecycleState::CooperativeLevelSet);

        if !windowed {
            self.set_display_mode(display)?;
            self.transition(LifecycleState::DisplayModeSet);
        }

        self.create_surfaces(display, window)?;

        let interface = self
            .backend
            .create_3d_interface(display)
            .map_err(GraphicsError::Interface3d)?;
        self.interface = Some(interface);

        self.attach_depth_buffer(display, interface)?;
        self.create_device(interface)?;
        self.configure_viewport()?;

        let device = self.device()?;
        self.backend
            .set_material(device, &self.materials[MaterialPreset::None])
            .map_err(GraphicsError::Material)?;
        self.transition(LifecycleState::MaterialsInitialized);

        self.push_projection()?;
        self.filter = FilterState::Both;
        Ok(())
    }

    fn set_display_mode(&mut self, display: Handle<DisplayContext>) -> Result<()> {
        let (width, height) = (self.config.screen.width, self.config.screen.height);

        let bits_per_pixel = match self.backend.set_display_mode(
            display,
            width,
            height,
            PREFERRED_BITS_PER_PIXEL,
        ) {
            Ok(()) => PREFERRED_BITS_PER_PIXEL,
            Err(error) => {
                warn!("{PREFERRED_BITS_PER_PIXEL} bpp display mode refused ({error}), falling back to {FALLBACK_BITS_PER_PIXEL} bpp");
                self.backend
                    .set_display_mode(display, width, height, FALLBACK_BITS_PER_PIXEL)
                    .map_err(|source| GraphicsError::DisplayMode {
                        width,
                        height,
                        source,
                    })?;
                FALLBACK_BITS_PER_PIXEL
            }
        };

        info!("Display mode set to {width}x{height}x{bits_per_pixel}");
        Ok(())
    }

    fn create_surfaces(
        &mut self,
        display: Handle<DisplayContext>,
        window: RawWindowHandle,
    ) -> Result<()> {
        let windowed = self.config.screen.windowed;

        let descriptor = if windowed {
            PrimarySurfaceDescriptor::Simple
        } else {
            PrimarySurfaceDescriptor::Flippable { back_buffers: 1 }
        };
        let primary = self
            .backend
            .create_primary_surface(display, descriptor)
            .map_err(GraphicsError::PrimarySurface)?;
        self.primary = Some(primary);
        self.transition(LifecycleState::PrimarySurfaceCreated);

        let back_buffer = if windowed {
            let (width, height) = self.backend.physical_screen_size();
            let back_buffer = self
                .backend
                .create_offscreen_surface(display, width, height)
                .map_err(GraphicsError::BackBuffer)?;
            self.back_buffer_size = (width, height);
            back_buffer
        } else {
            let back_buffer = self
                .backend
                .back_buffer_from_flip_chain(primary)
                .map_err(GraphicsError::BackBuffer)?;
            self.back_buffer_size = (self.config.screen.width, self.config.screen.height);
            back_buffer
        };
        self.back_buffer = Some(back_buffer);

        if !windowed {
            self.backend
                .clear_surface(primary)
                .map_err(GraphicsError::ClearSurface)?;
        }
        self.backend
            .clear_surface(back_buffer)
            .map_err(GraphicsError::ClearSurface)?;

        let clipper = self
            .backend
            .create_clipper(display)
            .map_err(GraphicsError::Clipper)?;
        self.clipper = Some(clipper);
        let screen = Rect::with_size(
            0,
            0,
            to_i32(self.config.screen.width),
            to_i32(self.config.screen.height),
        );
        self.backend
            .set_clip_list(clipper, &ClipList::new(vec![screen]))
            .map_err(GraphicsError::Clipper)?;
        self.backend
            .attach_clipper(back_buffer, clipper)
            .map_err(GraphicsError::Clipper)?;

        if windowed {
            let window_clipper = self
                .backend
                .create_clipper(display)
                .map_err(GraphicsError::WindowClipper)?;
            self.window_clipper = Some(window_clipper);
            self.backend
                .set_clipper_window(window_clipper, window)
                .map_err(GraphicsError::WindowClipper)?;
            self.backend
                .attach_clipper(primary, window_clipper)
                .map_err(GraphicsError::WindowClipper)?;
        }

        self.transition(LifecycleState::BackBufferBound);
        Ok(())
    }

    fn attach_depth_buffer(
        &mut self,
        display: Handle<DisplayContext>,
        interface: Handle<Interface3d>,
    ) -> Result<()> {
        let back_buffer = self.back_buffer.ok_or(GraphicsError::NotInitialized)?;

        let format = self
            .backend
            .enumerate_depth_formats(interface, DeviceTier::Hardware)
            .map_err(GraphicsError::DepthBuffer)?
            .into_iter()
            .find(DepthFormat::is_depth_only)
            .ok_or(GraphicsError::NoDepthFormat)?;

        let (width, height) = self.backend.physical_screen_size();
        let depth_buffer = self
            .backend
            .create_depth_buffer(display, width, height, format)
            .map_err(GraphicsError::DepthBuffer)?;
        self.depth_buffer = Some(depth_buffer);
        self.backend
            .attach_depth_buffer(back_buffer, depth_buffer)
            .map_err(GraphicsError::DepthBuffer)?;

        debug!(
            "Attached a {}-bit {width}x{height} depth buffer",
            format.bit_depth
        );
        self.transition(LifecycleState::DepthBufferAttached);
        Ok(())
    }

    fn create_device(&mut self, interface: Handle<Interface3d>) -> Result<()> {
        let back_buffer = self.back_buffer.ok_or(GraphicsError::NotInitialized)?;

        let mut last_error = None;
        for tier in DeviceTier::FALLBACK_ORDER {
            match self.backend.create_device(interface, tier, back_buffer) {
                Ok(device) => {
                    info!("Created a {tier:?} device");
                    self.device = Some(device);
                    self.device_tier = Some(tier);
                    self.transition(LifecycleState::DeviceCreated);
                    return Ok(());
                }
                Err(error) => {
                    warn!("Couldn't create a {tier:?} device: {error}");
                    last_error = Some(error);
                }
            }
        }

        Err(GraphicsError::Device(last_error.unwrap_or_else(|| {
            BackendError::Rejected("no device tier to try".to_string())
        })))
    }

    fn configure_viewport(&mut self) -> Result<()> {
        let device = self.device()?;
        let viewport = Viewport {
            x: 0,
            y: 0,
            width: self.config.screen.width,
            height: self
                .config
                .screen
                .height
                .saturating_sub(VIEWPORT_BOTTOM_MARGIN),
            min_z: 0.0,
            max_z: 1.0,
        };
        self.backend
            .set_viewport(device, &viewport)
            .map_err(GraphicsError::Viewport)?;
        self.viewport = Some(viewport);
        self.backend
            .set_render_state(device, RenderState::ZEnable, 1)
            .map_err(GraphicsError::Viewport)?;

        self.transition(LifecycleState::ViewportConfigured);
        Ok(())
    }

    fn device(&self) -> Result<Handle<Device>> {
        self.device.ok_or(GraphicsError::NotInitialized)
    }

    fn push_projection(&mut self) -> Result<()> {
        let Some(device) = self.device else {
            return Ok(());
        };
        let projection = self.projection();
        self.backend
            .set_transform(device, TransformKind::Projection, &projection)
            .map_err(GraphicsError::Transform)
    }

    /// Releases every held resource, most recently acquired first.
    ///
    /// Handles that were never acquired are skipped, so this is safe after a
    /// partial initialization and when called repeatedly.
    pub fn shutdown(&mut self) {
        let resources = [
            self.cursor_sheet.take().map(Resource::Surface),
            self.device.take().map(Resource::Device),
            self.depth_buffer.take().map(Resource::DepthBuffer),
            self.interface.take().map(Resource::Interface3d),
            self.window_clipper.take().map(Resource::Clipper),
            self.clipper.take().map(Resource::Clipper),
            self.back_buffer.take().map(Resource::Surface),
            self.primary.take().map(Resource::Surface),
            self.display.take().map(Resource::DisplayContext),
        ];
        for resource in resources.into_iter().flatten() {
            debug!("Releasing {resource:?}");
            self.backend.release(resource);
        }

        self.window = None;
        self.device_tier = None;
        self.back_buffer_size = (0, 0);
        self.viewport = None;
        self.current_texture = None;
        self.circles = None;
        self.filter = FilterState::None;
        if self.state != LifecycleState::Uninitialized {
            self.transition(LifecycleState::Uninitialized);
        }
    }

    #[must_use]
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == LifecycleState::Ready
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.config.screen.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.config.screen.height
    }

    #[must_use]
    pub fn is_windowed(&self) -> bool {
        self.config.screen.windowed
    }

    #[must_use]
    pub fn device_tier(&self) -> Option<DeviceTier> {
        self.device_tier
    }

    /// Whether the device runs on the hardware tier.
    #[must_use]
    pub fn is_hardware(&self) -> bool {
        self.device_tier == Some(DeviceTier::Hardware)
    }

    #[must_use]
    pub fn back_buffer_size(&self) -> (u32, u32) {
        self.back_buffer_size
    }

    #[must_use]
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    /// Rectangle software blits are clipped to.
    #[must_use]
    pub fn clip_rect(&self) -> Rect {
        surface::software_clip_rect(self.config.screen.width, self.config.screen.height)
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[must_use]
    pub fn view_extent(&self) -> f32 {
        self.view.extent()
    }

    #[must_use]
    pub fn projection(&self) -> Matrix4f {
        self.view
            .projection(self.config.screen.width, self.config.screen.height)
    }

    /// Sets the visible world width, clamped to the zoom limits, and pushes
    /// the new projection to the device if there is one.
    ///
    /// # Errors
    ///
    /// Returns an error if the device refuses the projection. The extent is
    /// updated regardless.
    pub fn set_view_extent(&mut self, extent: f32) -> Result<()> {
        self.view.set_extent(extent);
        self.push_projection()
    }

    /// # Errors
    ///
    /// Same as [`GraphicsSystem::set_view_extent`].
    pub fn zoom_by(&mut self, delta: f32) -> Result<()> {
        self.view.zoom_by(delta);
        self.push_projection()
    }

    #[must_use]
    pub fn view_transform(&self) -> Matrix4f {
        self.view_matrix
    }

    /// # Errors
    ///
    /// Returns an error if the system is not initialized or the device
    /// refuses the matrix, in which case the previous view is kept.
    pub fn set_view_transform(&mut self, view: Matrix4f) -> Result<()> {
        let device = self.device()?;
        self.backend
            .set_transform(device, TransformKind::View, &view)
            .map_err(GraphicsError::Transform)?;
        self.view_matrix = view;
        Ok(())
    }

    /// Pixel position of a world-space point on the back buffer.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    #[must_use]
    pub fn world_to_screen(&self, point: &Vector3f) -> Vector2i {
        let projected = (self.view_matrix * self.projection()).transform_point(point);
        let half_width = self.config.screen.width as f32 / 2.0;
        let half_height = self
            .config
            .screen
            .height
            .saturating_sub(VIEWPORT_BOTTOM_MARGIN) as f32
            / 2.0;
        Vector2i::new(
            (projected.x * half_width + half_width) as i32,
            (-projected.y * half_height + half_height) as i32,
        )
    }

    #[must_use]
    pub fn materials(&self) -> &Materials {
        &self.materials
    }

    #[must_use]
    pub fn material(&self, preset: MaterialPreset) -> &Material {
        &self.materials[preset]
    }

    /// # Errors
    ///
    /// Returns an error if the system is not initialized or the device
    /// refuses the material.
    pub fn set_material(&mut self, preset: MaterialPreset) -> Result<()> {
        let device = self.device()?;
        self.backend
            .set_material(device, &self.materials[preset])
            .map_err(GraphicsError::Material)
    }

    /// # Errors
    ///
    /// Returns an error if the system is not initialized or the device
    /// refuses the state.
    pub fn set_render_state(&mut self, state: RenderState, value: u32) -> Result<()> {
        let device = self.device()?;
        self.backend
            .set_render_state(device, state, value)
            .map_err(GraphicsError::RenderState)
    }

    #[must_use]
    pub fn current_texture(&self) -> Option<TextureHandle> {
        self.current_texture
    }

    /// Binds `texture` unless it is already the bound one.
    ///
    /// # Errors
    ///
    /// Returns an error if the system is not initialized or the device
    /// refuses the texture. The previous binding stays current.
    pub fn bind_texture(&mut self, texture: Option<TextureHandle>) -> Result<()> {
        if texture == self.current_texture {
            return Ok(());
        }

        let device = self.device()?;
        self.backend
            .set_texture(device, texture)
            .map_err(GraphicsError::Texture)?;
        self.current_texture = texture;
        Ok(())
    }

    /// Unbinds the texture, even when none is bound.
    ///
    /// # Errors
    ///
    /// Returns an error if the system is not initialized or the device
    /// refuses the call. The previous binding stays current.
    pub fn clear_texture(&mut self) -> Result<()> {
        let device = self.device()?;
        self.backend
            .set_texture(device, None)
            .map_err(GraphicsError::Texture)?;
        self.current_texture = None;
        Ok(())
    }

    #[must_use]
    pub fn filter_state(&self) -> FilterState {
        self.filter
    }

    pub fn set_filter_state(&mut self, filter: FilterState) {
        self.filter = filter;
    }

    #[must_use]
    pub fn cursor(&self) -> &CursorAnimation {
        &self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut CursorAnimation {
        &mut self.cursor
    }

    /// Looks up the animated overlay circle textures.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first circle texture `source` doesn't
    /// know. Previously set up circles are kept in that case.
    pub fn set_up_circles(&mut self, source: &dyn TextureSource) -> Result<()> {
        let mut circles = [TextureHandle::new(0); NUM_CIRCLE_FRAMES];
        for (circle, name) in circles.iter_mut().zip(CIRCLE_TEXTURES) {
            *circle = source
                .texture(name)
                .ok_or_else(|| GraphicsError::TextureNotFound(name.to_string()))?;
        }
        self.circles = Some(circles);
        Ok(())
    }

    /// Draws the current overlay circle frame as a quad of half-size
    /// `radius` centered on `at`, lit with the `preset` material.
    ///
    /// # Errors
    ///
    /// Returns an error if the system is not initialized, if the circles are
    /// not set up, or if the device refuses any of the calls.
    pub fn draw_circle(
        &mut self,
        at: &Vector3f,
        preset: MaterialPreset,
        radius: f32,
    ) -> Result<()> {
        let device = self.device()?;
        let circles = self.circles.ok_or(GraphicsError::CirclesNotSetUp)?;
        self.bind_texture(Some(circles[self.cursor.circle_frame()]))?;

        let white = Color::new(1.0, 1.0, 1.0, 1.0);
        let corner = |dx: f32, dy: f32, u: f32, v: f32| LitVertex {
            position: Vector3f::new(at.x + dx, at.y + dy, at.z),
            color: white,
            specular: white,
            u,
            v,
        };
        let vertices = [
            corner(-radius, -radius, 0.0, 0.0),
            corner(radius, -radius, 1.0, 0.0),
            corner(-radius, radius, 0.0, 1.0),
            corner(radius, radius, 1.0, 1.0),
        ];

        self.backend
            .set_material(device, &self.materials[preset])
            .map_err(GraphicsError::Material)?;
        self.backend
            .draw_primitive(device, PrimitiveType::TriangleStrip, &vertices)
            .map_err(GraphicsError::Draw)
    }

    /// Creates the off-screen surface holding the cursor cells, replacing
    /// any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the system is not initialized or the surface
    /// cannot be created.
    pub fn create_cursor_sheet(&mut self) -> Result<()> {
        let display = self.display.ok_or(GraphicsError::NotInitialized)?;
        let sheet = self
            .backend
            .create_offscreen_surface(display, CURSOR_SHEET_WIDTH, CURSOR_SHEET_HEIGHT)
            .map_err(GraphicsError::CursorSheet)?;
        if let Some(previous) = self.cursor_sheet.replace(sheet) {
            self.backend.release(Resource::Surface(previous));
        }
        Ok(())
    }

    /// Blits the current cursor frame to the back buffer, `at` being the
    /// mouse position.
    ///
    /// # Errors
    ///
    /// Returns an error if the system is not initialized, if there is no
    /// cursor sheet, or if the blit fails.
    pub fn draw_cursor(&mut self, at: Vector2i) -> Result<()> {
        let back_buffer = self.back_buffer.ok_or(GraphicsError::NotInitialized)?;
        let sheet = self.cursor_sheet.ok_or(GraphicsError::NoCursorSheet)?;
        let (source, destination) = self.cursor.blit_rects(at);
        self.backend
            .blit(back_buffer, destination, sheet, source)
            .map_err(GraphicsError::Draw)
    }

    /// Presents the back buffer.
    ///
    /// Fullscreen flips are retried until the driver accepts one. Windowed
    /// mode copies the screen-sized region of the back buffer into the
    /// window.
    ///
    /// # Errors
    ///
    /// Returns an error if the system is not initialized or if the windowed
    /// copy fails.
    pub fn flip(&mut self) -> Result<()> {
        let primary = self.primary.ok_or(GraphicsError::NotInitialized)?;

        if self.config.screen.windowed {
            let back_buffer = self.back_buffer.ok_or(GraphicsError::NotInitialized)?;
            let window = self.window.ok_or(GraphicsError::NotInitialized)?;
            let destination = self.backend.window_rect(window);
            let source = Rect::with_size(
                0,
                0,
                to_i32(self.config.screen.width),
                to_i32(self.config.screen.height),
            );
            return self
                .backend
                .blit(primary, destination, back_buffer, source)
                .map_err(GraphicsError::Present);
        }

        while let Err(error) = self.backend.flip(primary) {
            trace!("Flip refused ({error}), retrying");
        }
        Ok(())
    }
}

impl<B> Drop for GraphicsSystem<B>
where
    B: DisplayBackend,
{
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}
