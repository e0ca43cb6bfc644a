//! Script conversion tests.
//!
//! Most tests check the rewritten fragments. The reference files at the end
//! pin whole outputs.

use san_transformer::script::{find_component_literals, ScriptSource};
use pretty_assertions::assert_eq;
use san_transformer::{
    convert_component, translate_script, ConvertOptions, DiagnosticCode, ScriptOutput,
};

fn translate(source: &str) -> ScriptOutput {
    translate_script(source, &ConvertOptions::default()).expect("script should translate")
}

#[track_caller]
fn assert_contains(output: &str, fragments: &[&str]) {
    for fragment in fragments {
        assert!(
            output.contains(fragment),
            "expected `{fragment}` in:\n{output}"
        );
    }
}

#[track_caller]
fn assert_absent(output: &str, fragments: &[&str]) {
    for fragment in fragments {
        assert!(
            !output.contains(fragment),
            "unexpected `{fragment}` in:\n{output}"
        );
    }
}

// ============================================================================
// LOCATING COMPONENTS
// ============================================================================

#[test]
fn test_plain_scripts_are_not_components() {
    let output = translate("var a = 'seom';\nvar b = 1;\nnew B(1)\n").code;
    assert_contains(&output, &["var a = 'seom';", "var b = 1;", "new B(1);"]);
}

#[test]
fn test_find_component_literals() {
    let script = ScriptSource::new();
    let module = script
        .parse_module(
            "export default { name: 'a' };\nconst app = new Vue({ el: '#app' });\nnew Other({});\n",
        )
        .unwrap();
    let literals = find_component_literals(&module, &ConvertOptions::default());
    assert_eq!(literals.len(), 2);
}

#[test]
fn test_find_wrapped_component_literal() {
    let script = ScriptSource::new();
    let module = script
        .parse_module("export default ({ name: 'a' } as ComponentOptions);\n")
        .unwrap();
    assert_eq!(
        find_component_literals(&module, &ConvertOptions::default()).len(),
        1
    );
}

#[test]
fn test_constructor_becomes_factory() {
    let output = translate("const test = new Vue({\n    data: {\n        test: 1\n    }\n})\n").code;
    assert_contains(&output, &["const test = new San.defineComponent(", "initData"]);
    assert_absent(&output, &["Vue"]);
}

#[test]
fn test_mounted_instance_is_found() {
    let source = "new Vue({ data: { a: 1 }, methods: { f() { this.a = 2; } } }).$mount('#app');\n";
    let script = ScriptSource::new();
    let module = script.parse_module(source).unwrap();
    assert_eq!(
        find_component_literals(&module, &ConvertOptions::default()).len(),
        1
    );

    let output = translate(source).code;
    assert_contains(
        &output,
        &[
            "new San.defineComponent(",
            "initData",
            "this.data.set('a', 2)",
            ".$mount('#app')",
        ],
    );
    assert_absent(&output, &["Vue"]);
}

#[test]
fn test_chained_instance_in_declaration() {
    let output = translate("const vm = (new Vue({ el: '#app' }) as any).$mount().$nextTick(ready);\n").code;
    assert_contains(&output, &["new San.defineComponent(", "$nextTick(ready)"]);
    assert_absent(&output, &["Vue"]);
}

#[test]
fn test_custom_constructor_and_factory() {
    let options = ConvertOptions {
        constructors: vec!["Component".to_string()],
        component_factory: "defineComponent".to_string(),
        ..ConvertOptions::default()
    };
    let output = translate_script(
        "new Component({ methods: { a() { this.x = 1; } } });\nnew Vue({});\n",
        &options,
    )
    .unwrap()
    .code;
    assert_contains(
        &output,
        &["new defineComponent(", "this.data.set('x', 1)", "new Vue("],
    );
}

// ============================================================================
// OPTIONS
// ============================================================================

#[test]
fn test_data_object_is_wrapped() {
    let output = translate("new Vue({\n    data: {\n        test: 1\n    }\n})\n").code;
    assert_contains(&output, &["initData: function()", "return {", "test: 1"]);
    assert_absent(&output, &["data:"]);
}

#[test]
fn test_data_method_is_renamed() {
    let output = translate("export default {\n    data() {\n        return {};\n    }\n};\n").code;
    assert_contains(&output, &["initData()", "return {};"]);
}

#[test]
fn test_data_shorthand_is_wrapped() {
    let output = translate("const data = { a: 1 };\nexport default {\n    data\n};\n").code;
    assert_contains(&output, &["initData: function()", "return data;"]);
}

#[test]
fn test_custom_initializer_name() {
    let options = ConvertOptions {
        initializer: "state".to_string(),
        ..ConvertOptions::default()
    };
    let output = translate_script("export default { data() { return {}; } };\n", &options)
        .unwrap()
        .code;
    assert_contains(&output, &["state()"]);
    assert_absent(&output, &["data", "initData"]);
}

#[test]
fn test_data_with_parameters_reports() {
    let output = translate("export default {\n    data: function(vm) { return { a: vm.a }; }\n};\n");
    assert_contains(&output.code, &["initData: function(vm)"]);
    assert_eq!(output.diagnostics.len(), 1);
    assert_eq!(
        output.diagnostics[0].code,
        DiagnosticCode::UnsupportedDataInitializer
    );
}

#[test]
fn test_methods_are_flattened() {
    let output = translate(
        "new Vue({\n    data: {\n        test: 1\n    },\n    methods: {\n        test2(){\n            this.test = 2\n        }\n    },\n    created() {}\n})\n",
    )
    .code;
    assert_contains(&output, &["test2()", "this.data.set('test', 2);"]);
    assert_absent(&output, &["methods"]);

    let created = output.find("created").unwrap();
    let test2 = output.find("test2").unwrap();
    assert!(created < test2, "methods should move to the end:\n{output}");
}

#[test]
fn test_method_accessors() {
    let output = translate(
        "export default {\n    methods: {\n        test() {\n            console.log(this.some);\n            this.some = 1;\n            this.some.push(1);\n        }\n    }\n};\n",
    )
    .code;
    assert_contains(
        &output,
        &[
            "console.log(this.data.get('some'));",
            "this.data.set('some', 1);",
            "this.data.push('some', 1);",
        ],
    );
}

#[test]
fn test_computed_is_rewritten_in_place() {
    let output = translate(
        "// app Vue instance\nvar app = new Vue({\n    // watch todos change\n    watch: {\n        todos: {\n            handler: function(todos) {\n                todoStorage.save(todos);\n            },\n            deep: true\n        }\n    },\n    computed: {\n        filteredTodos: function() {\n            return filters[this.visibility](this.todos);\n        },\n        remaining() {\n            return this.todos.filter(isActive).length;\n        },\n        allDone: {\n            get: function() {\n                return this.remaining === 0;\n            },\n            set: function(value) {\n                this.todos.forEach(function(todo) { todo.completed = value; });\n            }\n        }\n    }\n})\n",
    )
    .code;
    assert_contains(
        &output,
        &[
            "// app Vue instance",
            "// watch todos change",
            "computed: {",
            "filters[this.data.get('visibility')](this.data.get('todos'))",
            "this.data.get('todos').filter(isActive).length",
            "this.data.get('remaining') === 0",
            "this.data.get('todos').forEach(function(todo)",
            "todoStorage.save(todos);",
        ],
    );
}

#[test]
fn test_pattern_targets_report() {
    let output = translate(
        "export default {\n    methods: {\n        reset() {\n            [this.a, this.b] = [1, 2];\n            for (this.i of xs) {}\n            this.c = 3;\n        }\n    }\n};\n",
    );
    assert_contains(&output.code, &["this.data.set('c', 3);", "this.i of xs"]);
    assert_absent(&output.code, &["get('a')", "set('a'", "get('i')"]);

    let codes: Vec<_> = output.diagnostics.iter().map(|d| d.code).collect();
    assert_eq!(codes, [DiagnosticCode::UnsupportedAssignmentTarget; 3]);
    assert!(output.diagnostics[2].message.contains("`this.i`"));
}

#[test]
fn test_watchers_are_untouched() {
    let output = translate("export default {\n    watch: {\n        a() { this.b = 1; }\n    }\n};\n").code;
    assert_contains(&output, &["this.b = 1"]);
}

// ============================================================================
// WHOLE FILES
// ============================================================================

#[test]
fn test_component_file() {
    let source = r#"<template>
    <ul>
        <li v-for="item in items" :key="item.id" @click="remove(item)">{{ item.name }}</li>
    </ul>
</template>
<script>
export default {
    data() {
        return { items: [] };
    },
    methods: {
        remove(item) {
            this.items.splice(this.items.indexOf(item), 1);
        }
    }
};
</script>
<style>
li { cursor: pointer; }
</style>
"#;
    let output = convert_component(source, &ConvertOptions::default()).unwrap();
    assert!(output.diagnostics.is_empty(), "{:?}", output.diagnostics);
    assert_contains(
        &output.code,
        &[
            r#"<li s-for="item in items trackBy item.id" on-click="remove(item)">{{ item.name }}</li>"#,
            "initData()",
            "this.data.splice('items', this.data.get('items').indexOf(item), 1);",
            "<style>\nli { cursor: pointer; }\n</style>\n",
        ],
    );
    assert_absent(&output.code, &["methods"]);
}

// ============================================================================
// REFERENCE FILES
// ============================================================================

fn convert(source: &str) -> String {
    convert_component(source, &ConvertOptions::default())
        .expect("component should convert")
        .code
}

#[test]
fn test_reference_plain_script_file() {
    let source = "<template>\n</template>\n<script>\n    var a = 'seom';\n    var b = 1;\n</script>\n<style>\n    .symbol {\n        height: 30px;   \n    }\n</style>\n";
    assert_eq!(
        convert(source),
        "<template>\n</template>\n<script>var a = 'seom';\nvar b = 1;\n</script>\n<style>\n    .symbol {\n        height: 30px;   \n    }\n</style>\n"
    );
}

#[test]
fn test_reference_data_initializer() {
    insta::assert_snapshot!(
        convert("<template>\n</template>\n<script>\nexport default {\n    data() {\n        return {\n\n        };\n    }\n};\n</script>\n<style>\n</style>"),
        @r"
    <template>
    </template>
    <script>export default {
        initData() {
            return {};
        }
    };
    </script>
    <style>
    </style>
    "
    );
}

#[test]
fn test_reference_empty_method() {
    insta::assert_snapshot!(
        convert("<template>\n</template>\n<script>\nexport default {\n    methods: {\n        test() {\n\n        }\n    }\n};\n</script>\n<style>\n</style>"),
        @r"
    <template>
    </template>
    <script>export default {
        test() {}
    };
    </script>
    <style>
    </style>
    "
    );
}

#[test]
fn test_reference_method_reads() {
    insta::assert_snapshot!(
        translate("\nexport default {\n    methods: {\n        test() {\n            console.log(this.some);\n        }\n    }\n};\n").code,
        @r"
    export default {
        test() {
            console.log(this.data.get('some'));
        }
    };
    "
    );
}

#[test]
fn test_reference_method_writes() {
    insta::assert_snapshot!(
        translate("\nexport default {\n    methods: {\n        test() {\n            this.some = 1;\n        }\n    }\n};\n").code,
        @r"
    export default {
        test() {
            this.data.set('some', 1);
        }
    };
    "
    );
}

#[test]
fn test_reference_method_array_calls() {
    insta::assert_snapshot!(
        translate("\nexport default {\n    methods: {\n        test() {\n            this.some.push(1);\n        }\n    }\n};\n").code,
        @r"
    export default {
        test() {
            this.data.push('some', 1);
        }
    };
    "
    );
}

#[test]
fn test_reference_plain_statements() {
    assert_eq!(translate("var a = 1;\n").code, "var a = 1;\n");
    assert_eq!(translate("new B()\n").code, "new B();\n");
    assert_eq!(translate("new B(1)\n").code, "new B(1);\n");
}

#[test]
fn test_reference_instance_data() {
    insta::assert_snapshot!(
        translate("new Vue({\n    data: {\n        test: 1\n    }\n})\n").code,
        @r"
    new San.defineComponent({
        initData: function() {
            return {
                test: 1
            };
        }
    });
    "
    );
}

#[test]
fn test_reference_instance_methods() {
    insta::assert_snapshot!(
        translate("new Vue({\n    data: {\n        test: 1\n    },\n    methods: {\n        test2(){\n            this.test = 2\n        }\n    }\n})\n").code,
        @r"
    new San.defineComponent({
        initData: function() {
            return {
                test: 1
            };
        },
        test2() {
            this.data.set('test', 2);
        }
    });
    "
    );
}

#[test]
fn test_reference_declared_instance() {
    insta::assert_snapshot!(
        translate("const test = new Vue({\n    data: {\n        test: 1\n    },\n    methods: {\n        test2(){\n            this.test = 2\n        }\n    }\n})\n").code,
        @r"
    const test = new San.defineComponent({
        initData: function() {
            return {
                test: 1
            };
        },
        test2() {
            this.data.set('test', 2);
        }
    });
    "
    );
}
