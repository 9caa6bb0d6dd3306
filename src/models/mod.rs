pub mod url;

pub use url::{
    ClickEvent, CreateUrlRequest, NewLink, ResolveResponse, ShortLink, Visitor, UNKNOWN_LOCATION,
};
