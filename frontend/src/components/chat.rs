use web_sys::Element;
use yew::prelude::*;

use crate::controller::{Message, Origin};

fn render_lines(text: &str) -> Html {
    html! {
        { for text.split('\n').enumerate().map(|(index, line)| html! {
            <>
                if index > 0 { <br /> }
                { line.to_string() }
            </>
        }) }
    }
}

#[derive(Properties, PartialEq)]
pub struct ChatBoxProps {
    pub messages: Vec<Message>,
    /// Shown instead of the messages when set.
    #[prop_or_default]
    pub placeholder: Option<AttrValue>,
}

#[function_component(ChatBox)]
pub fn chat_box(props: &ChatBoxProps) -> Html {
    let chat_ref = use_node_ref();

    {
        let chat_ref = chat_ref.clone();
        use_effect(move || {
            if let Some(chat) = chat_ref.cast::<Element>() {
                chat.set_scroll_top(chat.scroll_height());
            }
            || ()
        });
    }

    html! {
        <div ref={chat_ref} class="flex-1 overflow-y-auto space-y-3 p-4 bg-white rounded-xl border border-border min-h-[280px] max-h-[480px]">
            if let Some(placeholder) = &props.placeholder {
                <div class="max-w-[80%] px-4 py-2 rounded-xl bg-[#eef4f9] text-[#173E63] text-sm">
                    { placeholder.clone() }
                </div>
            } else {
                { for props.messages.iter().map(|message| {
                    let (row, bubble) = match message.origin {
                        Origin::User => ("flex justify-end", "max-w-[80%] px-4 py-2 rounded-xl bg-[#173E63] text-white text-sm"),
                        Origin::Bot => ("flex justify-start", "max-w-[80%] px-4 py-2 rounded-xl bg-[#eef4f9] text-[#173E63] text-sm"),
                    };
                    html! {
                        <div key={message.id} class={row}>
                            <div class={bubble}>
                                { render_lines(&message.text) }
                                if message.pending {
                                    <span class="inline-block ml-2 w-3 h-3 border-2 border-white/60 border-t-transparent rounded-full animate-spin"></span>
                                }
                            </div>
                        </div>
                    }
                }) }
            }
        </div>
    }
}
