use crate::store::Store;


/// The context that is accessible to every resolver in our API.
pub(crate) struct Context {
    pub(crate) store: Store,
}

impl juniper::Context for Context {}
