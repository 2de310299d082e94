//! Ambient light/dark preference, standing in for the platform's
//! `prefers-color-scheme`. Terminals advertise their palette through
//! `COLORFGBG` ("<fg>;<bg>"); a low background index means dark.

use std::env;

pub fn ambient_dark_preference() -> bool {
    dark_from_colorfgbg(env::var("COLORFGBG").ok().as_deref())
}

fn dark_from_colorfgbg(value: Option<&str>) -> bool {
    let Some(value) = value else {
        return false;
    };
    let Some(background) = value.rsplit(';').next() else {
        return false;
    };
    match background.parse::<u8>() {
        Ok(index) => index < 7 || index == 8,
        Err(_) => false,
    }
}
