pub mod context;
pub mod control_loop;
pub mod dispatcher;
pub mod finalizer;
pub mod frame_worker;
pub mod panorama_session;
