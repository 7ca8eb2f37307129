//! Headless CPU renderer
//!
//! Implements the backend seams without a GPU. Textures are shared BGRA8
//! pixel buffers, a clearing pass fills its target, and a layer keeps the
//! most recent presented frames so callers can inspect what reached the
//! "screen".

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::trace;

use crate::config::SurfaceConfig;
use crate::surface::{
    Backend, ClearColor, ColorAttachment, LoadAction, PixelFormat, RenderingLayer,
    SurfaceError, SurfaceLifecycle, SurfaceView, ViewId,
};

/// Drawables a layer hands out before it reports itself busy
pub const MAX_DRAWABLES: usize = 3;

/// Drawable size of a freshly created layer
pub const DEFAULT_DRAWABLE_SIZE: (u32, u32) = (64, 64);

/// Presented frames a layer remembers
pub const FRAME_HISTORY: usize = 16;

/// Identity of a headless object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(pub u64);

impl ObjectId {
    fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        ObjectId(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Headless backend marker
pub struct HeadlessBackend;

#[derive(Debug, Default)]
struct DeviceStats {
    queues_created: Cell<usize>,
    commits: Cell<usize>,
    queue_limit: Cell<Option<usize>>,
}

/// CPU "device"; clones share their statistics
#[derive(Debug, Clone)]
pub struct HeadlessDevice {
    name: String,
    stats: Rc<DeviceStats>,
}

impl HeadlessDevice {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stats: Rc::default(),
        }
    }

    /// Limit the number of queues the device creates (`None` = unlimited)
    pub fn set_queue_limit(&self, limit: Option<usize>) {
        self.stats.queue_limit.set(limit);
    }

    /// Command queues created so far
    pub fn queues_created(&self) -> usize {
        self.stats.queues_created.get()
    }

    /// Command buffers committed so far
    pub fn commits(&self) -> usize {
        self.stats.commits.get()
    }
}

/// Command queue
#[derive(Debug)]
pub struct HeadlessQueue {
    id: ObjectId,
    stats: Rc<DeviceStats>,
}

/// A pass recorded into a command buffer
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedPass {
    /// Descriptor the pass was begun with
    pub descriptor: ObjectId,
    /// Texture of color attachment 0
    pub target: ObjectId,
    pub load_action: LoadAction,
    pub clear_color: ClearColor,
    pub draw_calls: usize,
}

/// Command buffer
#[derive(Debug)]
pub struct HeadlessCommandBuffer {
    id: ObjectId,
    queue: ObjectId,
    stats: Rc<DeviceStats>,
    passes: Rc<RefCell<Vec<EncodedPass>>>,
    presented: RefCell<Option<HeadlessDrawable>>,
}

/// Render command encoder
#[derive(Debug)]
pub struct HeadlessRenderEncoder {
    pass: EncodedPass,
    passes: Rc<RefCell<Vec<EncodedPass>>>,
}

impl HeadlessRenderEncoder {
    /// Record a draw; the headless renderer does not rasterize geometry
    pub fn draw_primitives(&mut self, vertex_start: usize, vertex_count: usize) {
        trace!(
            "Draw {} vertices from {} into {:?}",
            vertex_count,
            vertex_start,
            self.pass.target
        );
        self.pass.draw_calls += 1;
    }
}

/// BGRA8 texture; clones share pixels
#[derive(Debug, Clone)]
pub struct HeadlessTexture {
    id: ObjectId,
    width: u32,
    height: u32,
    pixels: Rc<RefCell<Vec<u8>>>,
}

impl HeadlessTexture {
    fn new(width: u32, height: u32, format: PixelFormat) -> Self {
        let len = width as usize * height as usize * format.bytes_per_pixel();
        Self {
            id: ObjectId::new(),
            width,
            height,
            pixels: Rc::new(RefCell::new(vec![0; len])),
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// BGRA bytes of the pixel at (`x`, `y`)
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let pixels = self.pixels.borrow();
        let bytes = pixels.get(offset..offset + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    fn fill(&self, color: ClearColor) {
        let bgra = color.to_bgra8();
        for chunk in self.pixels.borrow_mut().chunks_exact_mut(4) {
            chunk.copy_from_slice(&bgra);
        }
    }
}

/// One-shot drawable; returns its slot to the layer when dropped
#[derive(Debug)]
pub struct HeadlessDrawable {
    id: ObjectId,
    texture: HeadlessTexture,
    layer: Rc<RefCell<LayerState>>,
}

impl Drop for HeadlessDrawable {
    fn drop(&mut self) {
        let mut state = self.layer.borrow_mut();
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

/// Render pass descriptor with a single color attachment
#[derive(Debug)]
pub struct HeadlessPassDescriptor {
    id: ObjectId,
    attachment: ColorAttachment,
    target: Option<HeadlessTexture>,
}

/// A frame that reached the layer
#[derive(Debug, Clone, PartialEq)]
pub struct PresentedFrame {
    pub drawable: ObjectId,
    pub texture: ObjectId,
    pub command_buffer: ObjectId,
    pub queue: ObjectId,
    pub passes: Vec<EncodedPass>,
}

#[derive(Debug)]
struct LayerState {
    visible: bool,
    drawable_size: (u32, u32),
    in_flight: usize,
    frames_presented: usize,
    history: VecDeque<PresentedFrame>,
    front: Option<HeadlessTexture>,
}

/// Compositor surface
#[derive(Debug)]
pub struct HeadlessLayer {
    pixel_format: PixelFormat,
    delegate: Option<ViewId>,
    device: Option<HeadlessDevice>,
    state: Rc<RefCell<LayerState>>,
}

impl HeadlessLayer {
    /// Simulate the window being shown or hidden
    pub fn set_visible(&self, visible: bool) {
        self.state.borrow_mut().visible = visible;
    }

    pub fn set_drawable_size(&self, width: u32, height: u32) {
        self.state.borrow_mut().drawable_size = (width, height);
    }

    /// Drawables currently handed out and not yet released
    pub fn drawables_in_flight(&self) -> usize {
        self.state.borrow().in_flight
    }

    /// Frames presented over the layer's lifetime
    pub fn frames_presented(&self) -> usize {
        self.state.borrow().frames_presented
    }

    /// Up to [`FRAME_HISTORY`] most recent frames, oldest first
    pub fn presented_frames(&self) -> Vec<PresentedFrame> {
        self.state.borrow().history.iter().cloned().collect()
    }

    /// Texture of the most recently presented frame
    pub fn front_buffer(&self) -> Option<HeadlessTexture> {
        self.state.borrow().front.clone()
    }
}

impl RenderingLayer<HeadlessBackend> for HeadlessLayer {
    fn new() -> Self {
        Self {
            pixel_format: PixelFormat::default(),
            delegate: None,
            device: None,
            state: Rc::new(RefCell::new(LayerState {
                visible: true,
                drawable_size: DEFAULT_DRAWABLE_SIZE,
                in_flight: 0,
                frames_presented: 0,
                history: VecDeque::with_capacity(FRAME_HISTORY),
                front: None,
            })),
        }
    }

    fn pixel_format(&self) -> PixelFormat {
        self.pixel_format
    }

    fn set_pixel_format(&mut self, format: PixelFormat) {
        self.pixel_format = format;
    }

    fn delegate(&self) -> Option<ViewId> {
        self.delegate
    }

    fn set_delegate(&mut self, view: ViewId) {
        self.delegate = Some(view);
    }

    fn device(&self) -> Option<&HeadlessDevice> {
        self.device.as_ref()
    }

    fn set_device(&mut self, device: HeadlessDevice) {
        self.device = Some(device);
    }

    fn next_drawable(&self) -> Option<HeadlessDrawable> {
        self.device.as_ref()?;

        let mut state = self.state.borrow_mut();
        if !state.visible || state.in_flight >= MAX_DRAWABLES {
            return None;
        }
        state.in_flight += 1;
        let (width, height) = state.drawable_size;
        drop(state);

        Some(HeadlessDrawable {
            id: ObjectId::new(),
            texture: HeadlessTexture::new(width, height, self.pixel_format),
            layer: Rc::clone(&self.state),
        })
    }
}

impl Backend for HeadlessBackend {
    type Device = HeadlessDevice;
    type CommandQueue = HeadlessQueue;
    type CommandBuffer = HeadlessCommandBuffer;
    type RenderEncoder = HeadlessRenderEncoder;
    type Texture = HeadlessTexture;
    type Drawable = HeadlessDrawable;
    type PassDescriptor = HeadlessPassDescriptor;
    type Layer = HeadlessLayer;

    fn device_name(device: &HeadlessDevice) -> String {
        device.name.clone()
    }

    fn new_command_queue(device: &HeadlessDevice) -> Option<HeadlessQueue> {
        let stats = &device.stats;
        if let Some(limit) = stats.queue_limit.get() {
            if stats.queues_created.get() >= limit {
                return None;
            }
        }
        stats.queues_created.set(stats.queues_created.get() + 1);

        Some(HeadlessQueue {
            id: ObjectId::new(),
            stats: Rc::clone(stats),
        })
    }

    fn new_command_buffer(queue: &HeadlessQueue) -> Option<HeadlessCommandBuffer> {
        Some(HeadlessCommandBuffer {
            id: ObjectId::new(),
            queue: queue.id,
            stats: Rc::clone(&queue.stats),
            passes: Rc::default(),
            presented: RefCell::new(None),
        })
    }

    fn new_pass_descriptor(attachment: &ColorAttachment) -> HeadlessPassDescriptor {
        HeadlessPassDescriptor {
            id: ObjectId::new(),
            attachment: *attachment,
            target: None,
        }
    }

    fn set_render_target(pass: &mut HeadlessPassDescriptor, texture: &HeadlessTexture) {
        pass.target = Some(texture.clone());
    }

    fn drawable_texture(drawable: &HeadlessDrawable) -> HeadlessTexture {
        drawable.texture.clone()
    }

    fn begin_render_pass(
        buffer: &HeadlessCommandBuffer,
        pass: &HeadlessPassDescriptor,
    ) -> Option<HeadlessRenderEncoder> {
        let target = pass.target.as_ref()?;
        if pass.attachment.load_action == LoadAction::Clear {
            target.fill(pass.attachment.clear_color);
        }

        Some(HeadlessRenderEncoder {
            pass: EncodedPass {
                descriptor: pass.id,
                target: target.id,
                load_action: pass.attachment.load_action,
                clear_color: pass.attachment.clear_color,
                draw_calls: 0,
            },
            passes: Rc::clone(&buffer.passes),
        })
    }

    fn end_encoding(encoder: HeadlessRenderEncoder) {
        encoder.passes.borrow_mut().push(encoder.pass);
    }

    fn present(buffer: &HeadlessCommandBuffer, drawable: HeadlessDrawable) {
        buffer.presented.replace(Some(drawable));
    }

    fn commit(buffer: HeadlessCommandBuffer) {
        buffer.stats.commits.set(buffer.stats.commits.get() + 1);

        let Some(drawable) = buffer.presented.take() else {
            trace!("Committed {:?} without a drawable", buffer.id);
            return;
        };

        let frame = PresentedFrame {
            drawable: drawable.id,
            texture: drawable.texture.id,
            command_buffer: buffer.id,
            queue: buffer.queue,
            passes: buffer.passes.borrow().clone(),
        };
        trace!("Presenting {:?}", frame.drawable);

        let mut state = drawable.layer.borrow_mut();
        state.front = Some(drawable.texture.clone());
        state.frames_presented += 1;
        if state.history.len() == FRAME_HISTORY {
            state.history.pop_front();
        }
        state.history.push_back(frame);
    }
}

/// Outcome of a headless run
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessReport {
    pub frames_presented: usize,
    pub commits: usize,
    pub queues_created: usize,
    /// Pixel (0, 0) of the last presented frame
    pub front_pixel: Option<[u8; 4]>,
}

/// Drive a view through its lifecycle and render `config.frames` frames
pub fn render_frames(config: SurfaceConfig) -> Result<HeadlessReport, SurfaceError> {
    let mut view = SurfaceView::<HeadlessBackend>::new(config);
    view.on_attach_to_surface();
    view.on_move_to_display();

    let device = HeadlessDevice::new("headless");
    view.assign_device(device.clone())?;
    for _ in 0..config.frames {
        view.redraw();
    }

    let layer = view.layer().ok_or(SurfaceError::NoBackingLayer)?;
    Ok(HeadlessReport {
        frames_presented: layer.frames_presented(),
        commits: device.commits(),
        queues_created: device.queues_created(),
        front_pixel: layer.front_buffer().and_then(|front| front.pixel(0, 0)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::ResourcePolicy;

    #[test]
    fn test_render_frames() {
        let report = render_frames(SurfaceConfig::default()).unwrap();
        assert_eq!(report.frames_presented, 3);
        assert_eq!(report.commits, 3);
        assert_eq!(report.queues_created, 1);
        assert_eq!(report.front_pixel, Some([0, 0, 255, 0]));

        let config = SurfaceConfig {
            frames: 5,
            ..SurfaceConfig::default().with_policy(ResourcePolicy::PerFrame)
        };
        let report = render_frames(config).unwrap();
        assert_eq!(report.frames_presented, 5);
        assert_eq!(report.queues_created, 5);
    }

    fn layer_with_device() -> (HeadlessLayer, HeadlessDevice) {
        let mut layer = HeadlessLayer::new();
        let device = HeadlessDevice::new("gpu");
        layer.set_device(device.clone());
        (layer, device)
    }

    #[test]
    fn test_no_drawable_without_device() {
        let layer = HeadlessLayer::new();
        assert!(layer.next_drawable().is_none());
    }

    #[test]
    fn test_drawable_pool() {
        let (layer, _device) = layer_with_device();
        let drawables: Vec<_> = (0..MAX_DRAWABLES)
            .filter_map(|_| layer.next_drawable())
            .collect();
        assert_eq!(drawables.len(), MAX_DRAWABLES);
        assert_eq!(layer.drawables_in_flight(), MAX_DRAWABLES);
        assert!(layer.next_drawable().is_none());

        drop(drawables);
        assert_eq!(layer.drawables_in_flight(), 0);
        assert!(layer.next_drawable().is_some());
    }

    #[test]
    fn test_drawable_size() {
        let (layer, _device) = layer_with_device();
        layer.set_drawable_size(8, 4);
        let drawable = layer.next_drawable().unwrap();
        let texture = HeadlessBackend::drawable_texture(&drawable);
        assert_eq!(texture.size(), (8, 4));
        assert_eq!(texture.pixel(7, 3), Some([0, 0, 0, 0]));
        assert_eq!(texture.pixel(8, 0), None);
    }

    #[test]
    fn test_load_pass_preserves_contents() {
        let (layer, device) = layer_with_device();
        let queue = HeadlessBackend::new_command_queue(&device).unwrap();
        let drawable = layer.next_drawable().unwrap();
        let texture = HeadlessBackend::drawable_texture(&drawable);

        let mut pass = HeadlessBackend::new_pass_descriptor(&ColorAttachment {
            load_action: LoadAction::Load,
            ..ColorAttachment::default()
        });
        HeadlessBackend::set_render_target(&mut pass, &texture);

        let buffer = HeadlessBackend::new_command_buffer(&queue).unwrap();
        let encoder = HeadlessBackend::begin_render_pass(&buffer, &pass).unwrap();
        HeadlessBackend::end_encoding(encoder);
        assert_eq!(texture.pixel(0, 0), Some([0, 0, 0, 0]));
    }

    #[test]
    fn test_pass_without_target_has_no_encoder() {
        let (_layer, device) = layer_with_device();
        let queue = HeadlessBackend::new_command_queue(&device).unwrap();
        let buffer = HeadlessBackend::new_command_buffer(&queue).unwrap();
        let pass = HeadlessBackend::new_pass_descriptor(&ColorAttachment::default());
        assert!(HeadlessBackend::begin_render_pass(&buffer, &pass).is_none());
    }

    #[test]
    fn test_draw_calls_are_recorded() {
        let (layer, device) = layer_with_device();
        let queue = HeadlessBackend::new_command_queue(&device).unwrap();
        let drawable = layer.next_drawable().unwrap();
        let mut pass = HeadlessBackend::new_pass_descriptor(&ColorAttachment::default());
        HeadlessBackend::set_render_target(&mut pass, &HeadlessBackend::drawable_texture(&drawable));

        let buffer = HeadlessBackend::new_command_buffer(&queue).unwrap();
        let mut encoder = HeadlessBackend::begin_render_pass(&buffer, &pass).unwrap();
        encoder.draw_primitives(0, 6);
        HeadlessBackend::end_encoding(encoder);
        HeadlessBackend::present(&buffer, drawable);
        HeadlessBackend::commit(buffer);

        let frames = layer.presented_frames();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].passes[0].draw_calls, 1);
        assert_eq!(device.commits(), 1);
        assert_eq!(layer.drawables_in_flight(), 0);
    }

    #[test]
    fn test_frame_history_is_bounded() {
        let (layer, device) = layer_with_device();
        let queue = HeadlessBackend::new_command_queue(&device).unwrap();
        let mut pass = HeadlessBackend::new_pass_descriptor(&ColorAttachment::default());
        let total = FRAME_HISTORY + 5;

        for _ in 0..total {
            let drawable = layer.next_drawable().unwrap();
            HeadlessBackend::set_render_target(&mut pass, &HeadlessBackend::drawable_texture(&drawable));
            let buffer = HeadlessBackend::new_command_buffer(&queue).unwrap();
            let encoder = HeadlessBackend::begin_render_pass(&buffer, &pass).unwrap();
            HeadlessBackend::end_encoding(encoder);
            HeadlessBackend::present(&buffer, drawable);
            HeadlessBackend::commit(buffer);
        }

        assert_eq!(layer.frames_presented(), total);
        assert_eq!(device.commits(), total);
        let frames = layer.presented_frames();
        assert_eq!(frames.len(), FRAME_HISTORY);
        let front = layer.front_buffer().unwrap();
        assert_eq!(frames[FRAME_HISTORY - 1].texture, front.id);
    }

    #[test]
    fn test_queue_limit() {
        let device = HeadlessDevice::new("gpu");
        device.set_queue_limit(Some(1));
        assert!(HeadlessBackend::new_command_queue(&device).is_some());
        assert!(HeadlessBackend::new_command_queue(&device).is_none());
        assert_eq!(device.queues_created(), 1);

        device.set_queue_limit(None);
        assert!(HeadlessBackend::new_command_queue(&device).is_some());
    }
}
