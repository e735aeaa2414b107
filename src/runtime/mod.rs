//! Runtime side: resolvers and the filesystem facade over both backends

pub mod dir;
pub mod file;
pub mod mode;
pub mod resolver;
pub mod stream;

pub use dir::Dir;
pub use file::File;
pub use mode::Mode;
pub use resolver::Resolver;
pub use stream::Stream;
