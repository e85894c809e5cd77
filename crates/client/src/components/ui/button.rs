use dioxus::prelude::*;

#[derive(Clone, Copy, Default, PartialEq, Eq)]
pub enum ButtonVariant {
    #[default]
    Primary,
    /// Low-emphasis, e.g. the chat close button.
    Subtle,
    /// Pill shown under a bot reply.
    Action,
}

impl ButtonVariant {
    fn class(self) -> &'static str {
        match self {
            ButtonVariant::Primary => "bg-amber-500 text-slate-900 hover:bg-amber-400 focus:ring-amber-500",
            ButtonVariant::Subtle => "bg-transparent text-slate-300 hover:bg-slate-700 hover:text-white focus:ring-slate-500",
            ButtonVariant::Action => "border border-amber-400 text-amber-300 rounded-full px-3 py-1 text-xs hover:bg-amber-400 hover:text-slate-900 focus:ring-amber-400",
        }
    }
}

#[derive(Props, Clone, PartialEq)]
pub struct ButtonProps {
    #[props(optional)]
    pub class: Option<String>,
    #[props(optional)]
    pub variant: Option<ButtonVariant>,
    #[props(optional)]
    pub r#type: Option<String>,
    #[props(optional)]
    pub disabled: Option<bool>,
    #[props(optional)]
    pub onclick: Option<EventHandler<MouseEvent>>,
    pub children: Element,
}

#[component]
pub fn Button(props: ButtonProps) -> Element {
    let variant = props.variant.unwrap_or_default();
    let disabled = props.disabled.unwrap_or(false);

    let base = "inline-flex items-center justify-center rounded-lg px-4 py-2 text-sm font-semibold transition-colors focus:outline-none focus:ring-2 disabled:opacity-50 disabled:pointer-events-none";
    let class = match props.class {
        Some(extra) if !extra.is_empty() => format!("{base} {} {extra}", variant.class()),
        _ => format!("{base} {}", variant.class()),
    };

    rsx! {
        button {
            class,
            r#type: props.r#type.unwrap_or_else(|| "button".to_string()),
            disabled,
            onclick: move |evt| {
                if disabled {
                    return;
                }
                if let Some(handler) = &props.onclick {
                    handler.call(evt);
                }
            },
            {props.children}
        }
    }
}
