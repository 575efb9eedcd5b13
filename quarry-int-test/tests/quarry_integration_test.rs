mod crud;
mod expression;
mod pipeline;
mod update;

#[ctor::ctor]
fn init() {
    colog::init();
}
