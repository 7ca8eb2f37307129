//! Render pass descriptors for the clear pass

use objc2::rc::Retained;
use objc2::runtime::ProtocolObject;
use objc2_metal::{MTLClearColor, MTLLoadAction, MTLRenderPassDescriptor, MTLStoreAction, MTLTexture};

use crate::surface::{ColorAttachment, LoadAction, StoreAction};

fn load_action_to_metal(action: LoadAction) -> MTLLoadAction {
    match action {
        LoadAction::DontCare => MTLLoadAction::DontCare,
        LoadAction::Load => MTLLoadAction::Load,
        LoadAction::Clear => MTLLoadAction::Clear,
    }
}

fn store_action_to_metal(action: StoreAction) -> MTLStoreAction {
    match action {
        StoreAction::DontCare => MTLStoreAction::DontCare,
        StoreAction::Store => MTLStoreAction::Store,
    }
}

/// Create a descriptor whose color attachment 0 follows `attachment`
pub fn clear_pass_descriptor(attachment: &ColorAttachment) -> Retained<MTLRenderPassDescriptor> {
    let render_pass = MTLRenderPassDescriptor::new();

    unsafe {
        let color_attachments = render_pass.colorAttachments();
        let color = color_attachments.objectAtIndexedSubscript(0);

        color.setLoadAction(load_action_to_metal(attachment.load_action));
        color.setStoreAction(store_action_to_metal(attachment.store_action));
        color.setClearColor(MTLClearColor {
            red: attachment.clear_color.red,
            green: attachment.clear_color.green,
            blue: attachment.clear_color.blue,
            alpha: attachment.clear_color.alpha,
        });
    }

    render_pass
}

/// Point color attachment 0 at this frame's texture
pub fn set_color_target(
    render_pass: &MTLRenderPassDescriptor,
    texture: &ProtocolObject<dyn MTLTexture>,
) {
    unsafe {
        let color = render_pass.colorAttachments().objectAtIndexedSubscript(0);
        color.setTexture(Some(texture));
    }
}
