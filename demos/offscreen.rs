use offscreen_host::engine::config::{AppConfig, OffscreenWindowOptions};
use offscreen_host::engine::events::{AppEvent, ContentsEvent};
use offscreen_host::render::backends::null::NullBackend;
use offscreen_host::{App, EngineError, OffscreenWindow};
use std::rc::Rc;
use std::thread::sleep;
use std::time::Duration;
use url::Url;

fn main() -> Result<(), EngineError> {
    env_logger::init();

    let backend = NullBackend::new()?;
    let app = App::new(AppConfig::default(), Rc::new(backend.clone()));

    app.on("offscreen-window-created", |ev| {
        if let AppEvent::OffscreenWindowCreated { window, .. } = ev {
            println!("created offscreen window {}", window.id());
        }
    });
    app.on("offscreen-window-blur", |ev| {
        if let AppEvent::OffscreenWindowBlur { window, .. } = ev {
            println!("offscreen window {} lost focus", window.id());
        }
    });
    app.set_ready();

    let options = OffscreenWindowOptions::builder()
        .size(1280, 720)
        .background_color("#ffffff")
        .build()?;
    let first = OffscreenWindow::new(&app, options.clone())?;
    let second = OffscreenWindow::new(&app, options)?;

    first.on("ready-to-show", |_| println!("first window is ready to show"));

    let url = Url::parse("https://gosub.io/").map_err(anyhow::Error::from)?;
    first.load_url(&url)?;
    first.contents().dispatch(&ContentsEvent::DidStartNavigation { url });
    first.contents().dispatch(&ContentsEvent::FirstVisuallyNonEmptyPaint);

    if let Some(host) = app.hosts().current() {
        println!("host {} holds {} surfaces", host.id(), host.child_count());
    }

    loop {
        let result = app.tick();
        if result.is_idle() {
            break;
        }
        sleep(result.next_tick_in.unwrap_or(Duration::from_millis(16)));
    }

    first.blur();
    first.close();
    second.close();

    println!("host alive after closing everything: {}", app.hosts().is_alive());
    Ok(())
}
