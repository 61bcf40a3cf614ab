mod link_attributes;
mod link_reference;
mod network_xml;

pub use link_attributes::LinkAttributes;
pub use link_reference::LinkReference;
