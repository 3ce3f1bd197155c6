use std::collections::HashSet;

use log::warn;
use raw_window_handle::RawWindowHandle;
use tenebra_math::matrix::Matrix4f;

use super::{
    BackendError, Clipper, CooperativeLevel, DepthBuffer, DepthFormat, Device, DeviceTier,
    DisplayBackend, DisplayContext, Handle, Interface3d, LitVertex, PrimarySurfaceDescriptor,
    PrimitiveType, RenderState, Resource, Result, Surface, TransformKind, Viewport,
};
use crate::material::Material;
use crate::surface::{ClipList, Rect};
use crate::texture::TextureHandle;

/// A backend call as recorded by [`HeadlessBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateDisplayContext,
    SetCooperativeLevel(CooperativeLevel),
    SetDisplayMode {
        width: u32,
        height: u32,
        bits_per_pixel: u32,
    },
    CreatePrimarySurface(PrimarySurfaceDescriptor),
    BackBufferFromFlipChain,
    CreateOffscreenSurface {
        width: u32,
        height: u32,
    },
    ClearSurface(Handle<Surface>),
    CreateClipper,
    SetClipList(ClipList),
    SetClipperWindow(Handle<Clipper>),
    AttachClipper {
        surface: Handle<Surface>,
        clipper: Handle<Clipper>,
    },
    Create3dInterface,
    EnumerateDepthFormats(DeviceTier),
    CreateDepthBuffer {
        width: u32,
        height: u32,
        format: DepthFormat,
    },
    AttachDepthBuffer {
        surface: Handle<Surface>,
        depth_buffer: Handle<DepthBuffer>,
    },
    CreateDevice(DeviceTier),
    SetViewport(Viewport),
    SetRenderState(RenderState, u32),
    SetMaterial(Material),
    SetTransform(TransformKind, Matrix4f),
    SetTexture(Option<TextureHandle>),
    DrawPrimitive(PrimitiveType, Vec<LitVertex>),
    Blit {
        destination: Handle<Surface>,
        destination_rect: Rect,
        source: Handle<Surface>,
        source_rect: Rect,
    },
    Flip,
    Release(Resource),
}

type FailurePredicate = Box<dyn FnMut(&Call) -> bool>;

/// A display driver without a display.
///
/// Hands out handles, records every call in order, and fails the calls
/// matched by the predicates registered with [`HeadlessBackend::fail_when`].
pub struct HeadlessBackend {
    physical_screen_size: (u32, u32),
    window_rect: Rect,
    depth_formats: Vec<DepthFormat>,
    calls: Vec<Call>,
    failures: Vec<FailurePredicate>,
    next_id: usize,
    live: HashSet<usize>,
}

impl HeadlessBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            physical_screen_size: (1920, 1080),
            window_rect: Rect::with_size(0, 0, 800, 600),
            depth_formats: vec![
                DepthFormat {
                    bit_depth: 32,
                    flags: DepthFormat::DEPTH | DepthFormat::STENCIL,
                },
                DepthFormat {
                    bit_depth: 16,
                    flags: DepthFormat::DEPTH,
                },
                DepthFormat {
                    bit_depth: 24,
                    flags: DepthFormat::DEPTH,
                },
            ],
            calls: vec![],
            failures: vec![],
            next_id: 1,
            live: HashSet::new(),
        }
    }

    #[must_use]
    pub fn with_physical_screen_size(mut self, width: u32, height: u32) -> Self {
        self.physical_screen_size = (width, height);
        self
    }

    #[must_use]
    pub fn with_window_rect(mut self, window_rect: Rect) -> Self {
        self.window_rect = window_rect;
        self
    }

    #[must_use]
    pub fn with_depth_formats(mut self, depth_formats: Vec<DepthFormat>) -> Self {
        self.depth_formats = depth_formats;
        self
    }

    /// Makes every call matching `predicate` fail with
    /// [`BackendError::Rejected`]. The call is still recorded.
    pub fn fail_when<P>(&mut self, predicate: P)
    where
        P: FnMut(&Call) -> bool + 'static,
    {
        self.failures.push(Box::new(predicate));
    }

    #[must_use]
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Hands over the calls recorded so far and starts a new log. Long
    /// running callers drain it once per frame.
    pub fn take_calls(&mut self) -> Vec<Call> {
        std::mem::take(&mut self.calls)
    }

    /// Resources released so far, in release order.
    #[must_use]
    pub fn released(&self) -> Vec<Resource> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                Call::Release(resource) => Some(*resource),
                _ => None,
            })
            .collect()
    }

    /// Number of handed out resources that haven't been released yet.
    #[must_use]
    pub fn live_resources(&self) -> usize {
        self.live.len()
    }

    fn record(&mut self, call: Call) -> Result<()> {
        let rejected = self
            .failures
            .iter_mut()
            .fold(false, |rejected, predicate| predicate(&call) || rejected);
        let description = format!("{call:?}");
        self.calls.push(call);
        if rejected {
            return Err(BackendError::Rejected(description));
        }
        Ok(())
    }

    fn ensure_live(&self, id: usize) -> Result<()> {
        if self.live.contains(&id) {
            Ok(())
        } else {
            Err(BackendError::InvalidHandle(id))
        }
    }

    fn acquire<T>(&mut self, call: Call) -> Result<Handle<T>> {
        self.record(call)?;
        let id = self.next_id;
        self.next_id += 1;
        self.live.insert(id);
        Ok(Handle::new(id))
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayBackend for HeadlessBackend {
    fn physical_screen_size(&self) -> (u32, u32) {
        self.physical_screen_size
    }

    fn window_rect(&self, _window: RawWindowHandle) -> Rect {
        self.window_rect
    }

    fn create_display_context(&mut self) -> Result<Handle<DisplayContext>> {
        self.acquire(Call::CreateDisplayContext)
    }

    fn set_cooperative_level(
        &mut self,
        display: Handle<DisplayContext>,
        _window: RawWindowHandle,
        level: CooperativeLevel,
    ) -> Result<()> {
        self.ensure_live(display.id())?;
        self.record(Call::SetCooperativeLevel(level))
    }

    fn set_display_mode(
        &mut self,
        display: Handle<DisplayContext>,
        width: u32,
        height: u32,
        bits_per_pixel: u32,
    ) -> Result<()> {
        self.ensure_live(display.id())?;
        self.record(Call::SetDisplayMode {
            width,
            height,
            bits_per_pixel,
        })?;
        self.physical_screen_size = (width, height);
        Ok(())
    }

    fn create_primary_surface(
        &mut self,
        display: Handle<DisplayContext>,
        descriptor: PrimarySurfaceDescriptor,
    ) -> Result<Handle<Surface>> {
        self.ensure_live(display.id())?;
        self.acquire(Call::CreatePrimarySurface(descriptor))
    }

    fn back_buffer_from_flip_chain(&mut self, primary: Handle<Surface>) -> Result<Handle<Surface>> {
        self.ensure_live(primary.id())?;
        self.acquire(Call::BackBufferFromFlipChain)
    }

    fn create_offscreen_surface(
        &mut self,
        display: Handle<DisplayContext>,
        width: u32,
        height: u32,
    ) -> Result<Handle<Surface>> {
        self.ensure_live(display.id())?;
        self.acquire(Call::CreateOffscreenSurface { width, height })
    }

    fn clear_surface(&mut self, surface: Handle<Surface>) -> Result<()> {
        self.ensure_live(surface.id())?;
        self.record(Call::ClearSurface(surface))
    }

    fn create_clipper(&mut self, display: Handle<DisplayContext>) -> Result<Handle<Clipper>> {
        self.ensure_live(display.id())?;
        self.acquire(Call::CreateClipper)
    }

    fn set_clip_list(&mut self, clipper: Handle<Clipper>, clip_list: &ClipList) -> Result<()> {
        self.ensure_live(clipper.id())?;
        self.record(Call::SetClipList(clip_list.clone()))
    }

    fn set_clipper_window(
        &mut self,
        clipper: Handle<Clipper>,
        _window: RawWindowHandle,
    ) -> Result<()> {
        self.ensure_live(clipper.id())?;
        self.record(Call::SetClipperWindow(clipper))
    }

    fn attach_clipper(&mut self, surface: Handle<Surface>, clipper: Handle<Clipper>) -> Result<()> {
        self.ensure_live(surface.id())?;
        self.ensure_live(clipper.id())?;
        self.record(Call::AttachClipper { surface, clipper })
    }

    fn create_3d_interface(
        &mut self,
        display: Handle<DisplayContext>,
    ) -> Result<Handle<Interface3d>> {
        self.ensure_live(display.id())?;
        self.acquire(Call::Create3dInterface)
    }

    fn enumerate_depth_formats(
        &mut self,
        interface: Handle<Interface3d>,
        tier: DeviceTier,
    ) -> Result<Vec<DepthFormat>> {
        self.ensure_live(interface.id())?;
        self.record(Call::EnumerateDepthFormats(tier))?;
        Ok(self.depth_formats.clone())
    }

    fn create_depth_buffer(
        &mut self,
        display: Handle<DisplayContext>,
        width: u32,
        height: u32,
        format: DepthFormat,
    ) -> Result<Handle<DepthBuffer>> {
        self.ensure_live(display.id())?;
        self.acquire(Call::CreateDepthBuffer {
            width,
            height,
            format,
        })
    }

    fn attach_depth_buffer(
        &mut self,
        surface: Handle<Surface>,
        depth_buffer: Handle<DepthBuffer>,
    ) -> Result<()> {
        self.ensure_live(surface.id())?;
        self.ensure_live(depth_buffer.id())?;
        self.record(Call::AttachDepthBuffer {
            surface,
            depth_buffer,
        })
    }

    fn create_device(
        &mut self,
        interface: Handle<Interface3d>,
        tier: DeviceTier,
        render_target: Handle<Surface>,
    ) -> Result<Handle<Device>> {
        self.ensure_live(interface.id())?;
        self.ensure_live(render_target.id())?;
        self.acquire(Call::CreateDevice(tier))
    }

    fn set_viewport(&mut self, device: Handle<Device>, viewport: &Viewport) -> Result<()> {
        self.ensure_live(device.id())?;
        self.record(Call::SetViewport(*viewport))
    }

    fn set_render_state(
        &mut self,
        device: Handle<Device>,
        state: RenderState,
        value: u32,
    ) -> Result<()> {
        self.ensure_live(device.id())?;
        self.record(Call::SetRenderState(state, value))
    }

    fn set_material(&mut self, device: Handle<Device>, material: &Material) -> Result<()> {
        self.ensure_live(device.id())?;
        self.record(Call::SetMaterial(*material))
    }

    fn set_transform(
        &mut self,
        device: Handle<Device>,
        kind: TransformKind,
        matrix: &Matrix4f,
    ) -> Result<()> {
        self.ensure_live(device.id())?;
        self.record(Call::SetTransform(kind, *matrix))
    }

    fn set_texture(
        &mut self,
        device: Handle<Device>,
        texture: Option<TextureHandle>,
    ) -> Result<()> {
        self.ensure_live(device.id())?;
        self.record(Call::SetTexture(texture))
    }

    fn draw_primitive(
        &mut self,
        device: Handle<Device>,
        primitive: PrimitiveType,
        vertices: &[LitVertex],
    ) -> Result<()> {
        self.ensure_live(device.id())?;
        self.record(Call::DrawPrimitive(primitive, vertices.to_vec()))
    }

    fn blit(
        &mut self,
        destination: Handle<Surface>,
        destination_rect: Rect,
        source: Handle<Surface>,
        source_rect: Rect,
    ) -> Result<()> {
        self.ensure_live(destination.id())?;
        self.ensure_live(source.id())?;
        self.record(Call::Blit {
            destination,
            destination_rect,
            source,
            source_rect,
        })
    }

    fn flip(&mut self, primary: Handle<Surface>) -> Result<()> {
        self.ensure_live(primary.id())?;
        self.record(Call::Flip)
    }

    fn release(&mut self, resource: Resource) {
        if !self.live.remove(&resource.id()) {
            warn!("Releasing {resource:?} which is not live");
        }
        self.calls.push(Call::Release(resource));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raw_window_handle::WebWindowHandle;

    fn window() -> RawWindowHandle {
        RawWindowHandle::Web(WebWindowHandle::new(1))
    }

    #[test]
    fn handles_are_distinct_and_tracked() {
        let mut backend = HeadlessBackend::new();

        let display = backend.create_display_context().unwrap();
        let clipper = backend.create_clipper(display).unwrap();

        assert_ne!(display.id(), clipper.id());
        assert_eq!(backend.live_resources(), 2);

        backend.release(Resource::Clipper(clipper));
        backend.release(Resource::DisplayContext(display));
        assert_eq!(backend.live_resources(), 0);
        assert_eq!(
            backend.released(),
            vec![
                Resource::Clipper(clipper),
                Resource::DisplayContext(display)
            ]
        );
    }

    #[test]
    fn calls_are_recorded_in_order() {
        let mut backend = HeadlessBackend::new();

        let display = backend.create_display_context().unwrap();
        backend
            .set_cooperative_level(display, window(), CooperativeLevel::Normal)
            .unwrap();

        assert_eq!(
            backend.calls(),
            &[
                Call::CreateDisplayContext,
                Call::SetCooperativeLevel(CooperativeLevel::Normal)
            ]
        );
    }

    #[test]
    fn take_calls_drains_the_log() {
        let mut backend = HeadlessBackend::new();
        let display = backend.create_display_context().unwrap();
        let primary = backend
            .create_primary_surface(display, PrimarySurfaceDescriptor::Simple)
            .unwrap();

        let setup = backend.take_calls();
        backend.flip(primary).unwrap();

        assert_eq!(setup.len(), 2);
        assert_eq!(backend.calls(), &[Call::Flip]);
        assert_eq!(backend.take_calls(), vec![Call::Flip]);
        assert!(backend.calls().is_empty());
        assert_eq!(backend.live_resources(), 2);
    }

    #[test]
    fn injected_failure_is_recorded_and_returned() {
        let mut backend = HeadlessBackend::new();
        backend.fail_when(|call| matches!(call, Call::CreateClipper));

        let display = backend.create_display_context().unwrap();
        let result = backend.create_clipper(display);

        assert!(matches!(result, Err(BackendError::Rejected(_))));
        assert_eq!(backend.calls().last(), Some(&Call::CreateClipper));
        assert_eq!(backend.live_resources(), 1);
    }

    #[test]
    fn failure_predicates_can_count() {
        let mut backend = HeadlessBackend::new();
        let mut remaining = 2;
        backend.fail_when(move |call| {
            if matches!(call, Call::Flip) && remaining > 0 {
                remaining -= 1;
                return true;
            }
            false
        });
        let display = backend.create_display_context().unwrap();
        let primary = backend
            .create_primary_surface(display, PrimarySurfaceDescriptor::Simple)
            .unwrap();

        assert!(backend.flip(primary).is_err());
        assert!(backend.flip(primary).is_err());
        assert!(backend.flip(primary).is_ok());
    }

    #[test]
    fn released_handles_are_invalid() {
        let mut backend = HeadlessBackend::new();
        let display = backend.create_display_context().unwrap();
        let surface = backend.create_offscreen_surface(display, 32, 32).unwrap();

        backend.release(Resource::Surface(surface));

        assert_eq!(
            backend.clear_surface(surface),
            Err(BackendError::InvalidHandle(surface.id()))
        );
    }

    #[test]
    fn depth_formats_are_configurable() {
        let only = DepthFormat {
            bit_depth: 24,
            flags: DepthFormat::DEPTH,
        };
        let mut backend = HeadlessBackend::new().with_depth_formats(vec![only]);
        let display = backend.create_display_context().unwrap();
        let interface = backend.create_3d_interface(display).unwrap();

        let formats = backend
            .enumerate_depth_formats(interface, DeviceTier::Hardware)
            .unwrap();

        assert_eq!(formats, vec![only]);
    }
}
