//  ██████╗  █████╗ ███████╗███████╗██╗███╗   ██╗ ██████╗
//  ██╔══██╗██╔══██╗██╔════╝██╔════╝██║████╗  ██║██╔════╝
//  ██████╔╝███████║███████╗███████╗██║██╔██╗ ██║██║  ███╗
//  ██╔═══╝ ██╔══██║╚════██║╚════██║██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║███████║███████║██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚══════╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

mod common;

#[cfg(test)]
mod passing {
    use i18n_harvest::control::{render_summary, ControlMessage, ControlReply};
    use i18n_harvest::page::PageSession;
    use i18n_harvest::store::{DomainStore, Entry};

    use crate::common::{client, session, FakeApi, PAGE_URL};

    const PAGE: &str = r#"<html><body><p data-i18n="a.b">Hello</p></body></html>"#;

    async fn ask(session: &mut PageSession, json: &str) -> String {
        let message = ControlMessage::from_json(json).unwrap();
        session.handle_message(message).await.unwrap().to_json().unwrap()
    }

    #[tokio::test]
    async fn mode_flags_round_trip() {
        let api = FakeApi::start(&["en"]).await;
        let store = DomainStore::in_memory().unwrap();
        let mut session = session(PAGE, &store, client(&api.base, None));
        session.settle().await.unwrap();

        assert_eq!(
            ask(&mut session, r#"{"action":"getInteractiveModeStatus"}"#).await,
            r#"{"interactiveModeEnabled":false}"#
        );
        assert_eq!(
            ask(&mut session, r#"{"action":"getEditStatus"}"#).await,
            r#"{"editable":false}"#
        );

        assert_eq!(ask(&mut session, r#"{"action":"enableInteractiveMode"}"#).await, "{}");
        assert_eq!(ask(&mut session, r#"{"action":"enableEdit"}"#).await, "{}");
        assert!(session.state().interactive_mode_enabled);
        assert!(session.state().editable);

        // edit mode is independent of interactive mode
        ask(&mut session, r#"{"action":"toggleInteractiveMode"}"#).await;
        assert_eq!(
            ask(&mut session, r#"{"action":"getInteractiveModeStatus"}"#).await,
            r#"{"interactiveModeEnabled":false}"#
        );
        assert_eq!(
            ask(&mut session, r#"{"action":"getEditStatus"}"#).await,
            r#"{"editable":true}"#
        );

        ask(&mut session, r#"{"action":"disableEdit"}"#).await;
        ask(&mut session, r#"{"action":"disableInteractiveMode"}"#).await;
        assert!(!session.state().editable);
        assert!(!session.state().interactive_mode_enabled);
    }

    #[tokio::test]
    async fn keyboard_command_toggles() {
        let api = FakeApi::start(&["en"]).await;
        let store = DomainStore::in_memory().unwrap();
        let mut session = session(PAGE, &store, client(&api.base, None));

        let reply = session
            .handle_command("toggle-interactive-mode")
            .await
            .unwrap();
        assert_eq!(reply, Some(ControlReply::ack()));
        assert!(session.state().interactive_mode_enabled);

        session
            .handle_command("toggle-interactive-mode")
            .await
            .unwrap();
        assert!(!session.state().interactive_mode_enabled);

        assert_eq!(session.handle_command("reload").await.unwrap(), None);
    }

    #[tokio::test]
    async fn save_message_merges_into_the_page_domain() {
        let api = FakeApi::start(&[]).await;
        let store = DomainStore::in_memory().unwrap();
        let mut session = session(PAGE, &store, client(&api.base, None));
        session.settle().await.unwrap();

        let reply = ask(
            &mut session,
            r#"{"action":"save_i18n_data","data":[{"a.b":"Changed"},{"nav.home":"Home"}]}"#,
        )
        .await;
        assert_eq!(reply, r#"{"appended":1,"total":2}"#);

        let record = store.read("acme.example.com").unwrap();
        assert_eq!(record.get("a.b"), Some("Hello"));
        assert_eq!(
            render_summary(&record),
            "Total keys: 2\n\"a.b\": \"Hello\"\n\"nav.home\": \"Home\""
        );
        assert_eq!(
            record.entries(),
            &[Entry::new("a.b", "Hello"), Entry::new("nav.home", "Home")]
        );
    }

    #[tokio::test]
    async fn tab_url_is_the_page_location() {
        let api = FakeApi::start(&[]).await;
        let store = DomainStore::in_memory().unwrap();
        let mut session = session(PAGE, &store, client(&api.base, None));

        let reply = session
            .handle_message(ControlMessage::GetTabUrl)
            .await
            .unwrap();
        assert_eq!(
            reply,
            ControlReply::TabUrl {
                url: PAGE_URL.to_string()
            }
        );
    }

    #[tokio::test]
    async fn reset_then_summary() {
        let api = FakeApi::start(&[]).await;
        let store = DomainStore::in_memory().unwrap();
        session(PAGE, &store, client(&api.base, None))
            .settle()
            .await
            .unwrap();

        assert!(store.reset("acme.example.com").unwrap());
        assert_eq!(
            render_summary(&store.read("acme.example.com").unwrap()),
            "Total keys: 0\nNo data-i18n attributes found."
        );
    }
}

//  ███████╗ █████╗ ██╗██╗     ██╗███╗   ██╗ ██████╗
//  ██╔════╝██╔══██╗██║██║     ██║████╗  ██║██╔════╝
//  █████╗  ███████║██║██║     ██║██╔██╗ ██║██║  ███╗
//  ██╔══╝  ██╔══██║██║██║     ██║██║╚██╗██║██║   ██║
//  ██║     ██║  ██║██║███████╗██║██║ ╚████║╚██████╔╝
//  ╚═╝     ╚═╝  ╚═╝╚═╝╚══════╝╚═╝╚═╝  ╚═══╝ ╚═════╝

#[cfg(test)]
mod failing {
    use i18n_harvest::control::ControlMessage;

    #[test]
    fn malformed_messages() {
        assert!(ControlMessage::from_json(r#"{"action":"save_i18n_data"}"#).is_err());
        assert!(ControlMessage::from_json(r#"{"action":"save_i18n_data","data":[{}]}"#).is_err());
        assert!(ControlMessage::from_json(r#"{"type":"enableEdit"}"#).is_err());
        assert!(ControlMessage::from_json("enableEdit").is_err());
    }
}
