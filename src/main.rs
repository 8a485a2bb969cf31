mod app;
mod logging;

fn main() {
    logging::init();
    yew::Renderer::<app::App>::new().render();
}
