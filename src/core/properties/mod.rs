pub mod codec;
pub mod format;

pub use codec::{
    add_to_value_list, decode_list, encode_list, encode_record, remove_from_value_list, ListRecord,
};
pub use format::{
    parse_properties, read_properties, render_properties, write_properties, PropertyMap,
};
