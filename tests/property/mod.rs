mod paths;
mod snapshot;
