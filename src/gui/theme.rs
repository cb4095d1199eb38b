use eframe::egui::{
    self,
    Color32,
    RichText,
    Stroke,
    Visuals,
};

#[derive(Clone)]
pub struct Theme {
    background: Color32,
    background_dark: Color32,
    background_light: Color32,
    foreground: Color32,
    selection: Color32,
    red: Color32,
    orange: Color32,
    green: Color32,
    purple: Color32,
    cyan: Color32,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dracula()
    }
}

impl Theme {
    //Colors from:
    //https://github.com/ShabbirHasan1/egui_dracula/blob/master/src/lib.rs
    pub fn dracula() -> Self {
        Self {
            background: Color32::from_rgb(0x28, 0x2a, 0x36),
            background_dark: Color32::from_rgb(33, 35, 53),
            background_light: Color32::from_rgb(52, 54, 66),
            foreground: Color32::from_rgb(0xf8, 0xf8, 0xf2),
            selection: Color32::from_rgb(0x44, 0x47, 0x5a),
            red: Color32::from_rgb(0xff, 0x55, 0x55),
            orange: Color32::from_rgb(0xff, 0xb8, 0x6c),
            green: Color32::from_rgb(0x50, 0xfa, 0x7b),
            purple: Color32::from_rgb(189, 147, 249),
            cyan: Color32::from_rgb(139, 233, 253),
        }
    }

    pub fn heading(&self, content: &str) -> RichText {
        RichText::new(content).color(self.purple)
    }

    pub fn field_label(&self, content: &str) -> RichText {
        RichText::new(content).color(self.orange)
    }

    pub fn approved(&self) -> Color32 {
        self.green
    }

    pub fn denied(&self) -> Color32 {
        self.red
    }

    pub fn pending(&self) -> Color32 {
        self.cyan
    }

    pub fn red(&self) -> Color32 {
        self.red
    }
}

pub fn set_theme(ctx: &egui::Context, theme: &Theme) {
    let default = Visuals::dark();
    let mut visuals = Visuals {
        dark_mode: true,
        hyperlink_color: theme.cyan,
        extreme_bg_color: theme.background_dark,
        error_fg_color: theme.red,
        warn_fg_color: theme.orange,
        window_fill: theme.background,
        window_stroke: Stroke { color: theme.background_light, ..default.window_stroke },
        panel_fill: theme.background_dark,
        ..default
    };

    visuals.selection.bg_fill = theme.selection;
    visuals.widgets.inactive.bg_fill = theme.background_light;
    visuals.widgets.inactive.weak_bg_fill = theme.background_light;
    visuals.widgets.hovered.bg_stroke.color = theme.cyan;
    visuals.widgets.active.bg_stroke.color = theme.cyan;
    visuals.widgets.noninteractive.fg_stroke.color = theme.foreground;

    ctx.set_visuals_of(egui::Theme::Dark, visuals);
    ctx.set_theme(egui::Theme::Dark);
}
