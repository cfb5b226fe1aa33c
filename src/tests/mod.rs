#[cfg(test)]
mod render_machine_tests {
    use std::collections::BTreeSet;
    use std::sync::{Arc, Mutex};

    use crate::{
        Accessor, CacheAdapter, CachedRender, ComponentId, RenderContext, RenderError,
        RenderResult, RenderState, Step,
    };

    #[derive(Debug, Clone, PartialEq)]
    enum TestNode {
        Text(&'static str),
        Div(Vec<TestNode>),
        Frag(Vec<TestNode>),
        Comp(&'static str, Box<TestNode>),
        /// A cacheable component, keyed by its name.
        Cached(&'static str, Box<TestNode>),
        /// Buffers its template under `key` without registering a component.
        CacheOnly(&'static str, Box<TestNode>),
    }

    use TestNode::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Render(TestNode, bool),
        Write(String),
        Done,
    }

    type Commits = Arc<Mutex<Vec<(String, CachedRender)>>>;

    fn recording_cache() -> (Arc<CacheAdapter>, Commits) {
        let commits: Commits = Arc::default();
        let sink = Arc::clone(&commits);
        let adapter = CacheAdapter::builder()
            .get(Accessor::sync(|_| None))
            .set(move |key, value| {
                sink.lock().unwrap().push((key.to_string(), value));
                Ok(())
            })
            .build()
            .unwrap();
        (Arc::new(adapter), commits)
    }

    fn render_test_node(node: TestNode, context: &mut RenderContext<TestNode>) {
        match node {
            Text(text) => context.write(text),
            Div(children) => {
                context.write("<div>");
                context.push_element(children, "</div>");
            }
            Frag(children) => context.push_fragment(children),
            Comp(name, template) => {
                context.enter_component(ComponentId::from(name));
                context.register_component(ComponentId::from(name));
                render_test_node(*template, context);
            }
            Cached(name, template) => {
                context.enter_cached_component(name);
                render_test_node(Comp(name, template), context);
            }
            CacheOnly(key, template) => {
                context.enter_cached_component(key);
                render_test_node(*template, context);
            }
        }
    }

    fn run_with<F>(mut context: RenderContext<TestNode>, mut render: F) -> RenderResult<Vec<Event>>
    where
        F: FnMut(TestNode, &mut RenderContext<TestNode>),
    {
        let mut events = Vec::new();
        loop {
            match context.resume()? {
                Step::Render { node, is_root } => {
                    events.push(Event::Render(node.clone(), is_root));
                    render(node, &mut context);
                }
                Step::Write(text) => events.push(Event::Write(text)),
                Step::Done => {
                    events.push(Event::Done);
                    return Ok(events);
                }
            }
        }
    }

    fn run(context: RenderContext<TestNode>) -> RenderResult<Vec<Event>> {
        run_with(context, render_test_node)
    }

    fn output(events: &[Event]) -> String {
        events
            .iter()
            .filter_map(|event| match event {
                Event::Write(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_element_children_then_end_tag() -> RenderResult<()> {
        // Only the element itself produces output here.
        let root = Div(vec![Text("a"), Text("b")]);
        let events = run_with(RenderContext::new(root.clone()), |node, context| {
            if let Div(children) = node {
                context.push_element(children, "</div>");
            }
        })?;

        assert_eq!(
            events,
            vec![
                Event::Render(root, true),
                Event::Render(Text("a"), false),
                Event::Render(Text("b"), false),
                Event::Write("</div>".to_string()),
                Event::Done,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_renders_in_pre_order() -> RenderResult<()> {
        let root = Div(vec![
            Text("1"),
            Frag(vec![Text("2"), Div(vec![Text("3")])]),
            Div(vec![Text("4"), Text("5")]),
            Text("6"),
        ]);

        let events = run(RenderContext::new(root))?;

        let texts: Vec<&str> = events
            .iter()
            .filter_map(|event| match event {
                Event::Render(Text(text), _) => Some(*text),
                _ => None,
            })
            .collect();
        assert_eq!(texts, vec!["1", "2", "3", "4", "5", "6"]);
        assert_eq!(
            output(&events),
            "<div>12<div>3</div><div>45</div>6</div>"
        );

        // The inner end tag is written before the next sibling is rendered.
        let close = events
            .iter()
            .position(|e| *e == Event::Write("</div>".to_string()))
            .unwrap();
        let four = events
            .iter()
            .position(|e| *e == Event::Render(Div(vec![Text("4"), Text("5")]), false))
            .unwrap();
        assert!(close < four);
        Ok(())
    }

    #[test]
    fn test_empty_fragment_and_root_text() -> RenderResult<()> {
        let events = run(RenderContext::new(Frag(vec![])))?;
        assert_eq!(events, vec![Event::Render(Frag(vec![]), true), Event::Done]);

        let events = run(RenderContext::new(Text("only")))?;
        assert_eq!(output(&events), "only");
        Ok(())
    }

    #[test]
    fn test_component_frames_restore_active_component() -> RenderResult<()> {
        let root = Comp(
            "outer",
            Box::new(Frag(vec![
                Comp("inner", Box::new(Frag(vec![Text("x")]))),
                Text("y"),
            ])),
        );
        let mut seen = Vec::new();

        let mut context = RenderContext::new(root).with_active_component("app".into());
        loop {
            match context.resume()? {
                Step::Render { node, .. } => {
                    if let Text(text) = &node {
                        seen.push((*text, context.active_component().cloned()));
                    }
                    render_test_node(node, &mut context);
                }
                Step::Write(_) => {}
                Step::Done => break,
            }
        }

        assert_eq!(
            seen,
            vec![
                ("x", Some(ComponentId::from("inner"))),
                ("y", Some(ComponentId::from("outer"))),
            ]
        );
        assert_eq!(context.active_component(), Some(&ComponentId::from("app")));
        assert!(context.states().is_empty());
        Ok(())
    }

    #[test]
    fn test_top_level_commit_flushes_buffer() -> RenderResult<()> {
        let (cache, commits) = recording_cache();
        let root = CacheOnly("k", Box::new(Text("<span>x</span>")));
        let mut context = RenderContext::new(root).with_cache(cache);

        assert!(matches!(context.resume()?, Step::Render { is_root: true, .. }));
        render_test_node(CacheOnly("k", Box::new(Text("<span>x</span>"))), &mut context);
        assert!(context.is_caching());
        assert_eq!(context.buffers().unwrap().segment(0), Some("<span>x</span>"));

        assert_eq!(context.resume()?, Step::Write("<span>x</span>".to_string()));
        assert!(!context.is_caching());
        assert_eq!(context.resume()?, Step::Done);

        let commits = commits.lock().unwrap();
        assert_eq!(
            *commits,
            vec![(
                "k".to_string(),
                CachedRender {
                    html: "<span>x</span>".to_string(),
                    components: Default::default(),
                }
            )]
        );
        Ok(())
    }

    #[test]
    fn test_nested_commit_merges_into_parent() -> RenderResult<()> {
        let tree = |b: TestNode, a: fn(&'static str, Box<TestNode>) -> TestNode| {
            a(
                "A",
                Box::new(Div(vec![Text("a1"), b, Text("a2")])),
            )
        };
        let (cache, commits) = recording_cache();
        let cached_root = tree(Cached("B", Box::new(Div(vec![Text("b")]))), Cached);

        let events = run(RenderContext::new(cached_root).with_cache(cache))?;

        // Nothing reaches the writer until the outermost component commits.
        let writes: Vec<&Event> = events
            .iter()
            .filter(|e| matches!(e, Event::Write(_)))
            .collect();
        assert_eq!(writes.len(), 1);

        let commits = commits.lock().unwrap();
        assert_eq!(commits.len(), 2);
        let (b_key, b) = &commits[0];
        let (a_key, a) = &commits[1];
        assert_eq!(b_key, "B");
        assert_eq!(b.html, "<div>b</div>");
        assert_eq!(b.components, BTreeSet::from([ComponentId::from("B")]));
        assert_eq!(a_key, "A");
        assert_eq!(a.html, "<div>a1<div>b</div>a2</div>");
        assert_eq!(
            a.components,
            BTreeSet::from([ComponentId::from("A"), ComponentId::from("B")])
        );

        // Same markup as rendering both components uncached.
        let uncached = run(RenderContext::new(tree(
            Comp("B", Box::new(Div(vec![Text("b")]))),
            Comp,
        )))?;
        assert_eq!(output(&uncached), a.html);
        assert_eq!(output(&events), a.html);
        Ok(())
    }

    #[test]
    fn test_nested_commit_truncates_parent_slots() -> RenderResult<()> {
        let (cache, _commits) = recording_cache();
        let root = CacheOnly(
            "outer",
            Box::new(Frag(vec![
                CacheOnly("first", Box::new(Text("1"))),
                CacheOnly("second", Box::new(Text("2"))),
            ])),
        );
        let mut context = RenderContext::new(root).with_cache(cache);

        let mut depths = Vec::new();
        loop {
            match context.resume()? {
                Step::Render { node, .. } => {
                    render_test_node(node, &mut context);
                    depths.push(context.buffers().map(|b| b.depth()));
                }
                Step::Write(text) => assert_eq!(text, "12"),
                Step::Done => break,
            }
        }

        // Each sibling reuses slot 1 after the previous one was committed.
        assert_eq!(depths, vec![Some(1), Some(2), Some(2)]);
        assert!(!context.is_caching());
        Ok(())
    }

    #[test]
    fn test_cache_commit_error_is_terminal() {
        let adapter = CacheAdapter::builder()
            .get(Accessor::sync(|_| None))
            .set(|_, _| Err(anyhow::anyhow!("store unavailable")))
            .build()
            .unwrap();
        let root = Div(vec![CacheOnly("k", Box::new(Text("x"))), Text("after")]);
        let mut context = RenderContext::new(root).with_cache(Arc::new(adapter));

        let mut writes = Vec::new();
        let err = loop {
            match context.resume() {
                Ok(Step::Render { node, .. }) => render_test_node(node, &mut context),
                Ok(Step::Write(text)) => writes.push(text),
                Ok(Step::Done) => panic!("render should fail"),
                Err(err) => break err,
            }
        };

        assert!(matches!(err, RenderError::CacheCommit { ref key, .. } if key == "k"));
        assert_eq!(writes, vec!["<div>".to_string()]);
        assert!(context.is_finished());
        assert!(matches!(context.resume(), Err(RenderError::Finished)));
    }

    #[test]
    fn test_resume_after_done_fails() -> RenderResult<()> {
        let mut context = RenderContext::new(Text("x"));
        assert!(matches!(context.resume()?, Step::Render { .. }));
        assert!(context.is_suspended());
        render_test_node(Text("x"), &mut context);
        assert_eq!(context.resume()?, Step::Write("x".to_string()));
        assert_eq!(context.resume()?, Step::Done);
        assert!(context.is_finished());

        // Output attempted after completion is dropped.
        context.write("late");
        assert!(matches!(context.resume(), Err(RenderError::Finished)));
        Ok(())
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside a render step")]
    fn test_frames_require_a_pending_render_step() {
        let mut context = RenderContext::new(Frag(vec![]));
        context.push_fragment(vec![Text("early")]);
    }

    #[test]
    fn test_cursor_advances_on_each_child() -> RenderResult<()> {
        let mut context = RenderContext::new(Frag(vec![Text("a"), Text("b")]));
        context.resume()?;
        render_test_node(Frag(vec![Text("a"), Text("b")]), &mut context);
        context.resume()?;

        assert_eq!(
            context.states(),
            &[RenderState::Fragment {
                children: vec![Text("a"), Text("b")],
                rendered: 1,
                total: 2,
            }]
        );
        Ok(())
    }
}
