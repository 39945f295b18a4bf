use apiforge::generator::{OpenApiRenderer, PlsqlRenderer, PostmanRenderer, RenderOptions};
use apiforge::ApiDescriptor;
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn example_descriptor() -> &'static str {
    r#"
apiName: List Orders
apiCode: LIST_ORDERS
httpMethod: GET
basePath: /api/v2
endpointPath: /customers/{customerId}/orders
tags: [sales, orders]
schemaConfig:
  schemaName: SALES
  objectName: ORDERS
  operation: SELECT
  enableSorting: true
  defaultSortColumn: ORDER_DATE
  defaultSortDirection: DESC
  enablePagination: true
  pageSize: 50
authConfig:
  authType: OAUTH2
  oauthScopes: [orders.read]
parameters:
  - { key: customerId, dbColumn: CUSTOMER_ID, oracleType: NUMBER, apiType: integer, location: path, required: true }
  - { key: status, dbColumn: STATUS, location: query, defaultValue: "'OPEN'", position: 1 }
  - { key: channel, dbColumn: SALES_CHANNEL, location: query, example: web, position: 2 }
  - { key: requestId, location: header, position: 3 }
responseMappings:
  - { apiField: orderId, dbColumn: ORDER_ID, apiType: integer }
  - { apiField: orderDate, dbColumn: ORDER_DATE, format: date, position: 1 }
  - { apiField: total, dbColumn: ORDER_TOTAL, apiType: number, position: 2 }
  - { apiField: status, dbColumn: STATUS, position: 3 }
  - { apiField: notes, dbColumn: NOTES, nullable: true, position: 4 }
headers:
  - { key: Accept-Language, value: en }
"#
}

fn bench_render_throughput(c: &mut Criterion) {
    let descriptor =
        ApiDescriptor::from_yaml(example_descriptor()).expect("failed to parse descriptor");
    let plsql = PlsqlRenderer::new();
    let openapi = OpenApiRenderer::new(RenderOptions::default());
    let postman = PostmanRenderer::new(RenderOptions::default());

    c.bench_function("render_plsql", |b| {
        b.iter(|| black_box(plsql.render(black_box(&descriptor))))
    });
    c.bench_function("render_openapi", |b| {
        b.iter(|| black_box(openapi.render(black_box(&descriptor))))
    });
    c.bench_function("render_postman", |b| {
        b.iter(|| black_box(postman.render(black_box(&descriptor))))
    });
}

criterion_group!(benches, bench_render_throughput);
criterion_main!(benches);
